use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tempfile::TempDir;

use spantask::config::Config;
use spantask::host::{Align, Host, TimerId, TimerQueue};
use spantask::items::pool::{BUNDLED_PROCESSING_ITEMS, BUNDLED_TARGETS};
use spantask::items::{ItemPool, Material};
use spantask::session::input::Input;
use spantask::session::script::{Dispatch, ScriptChain, standard_script};
use spantask::store::results_file::ResultsFile;

const PROCESSING: &str = "\
(1 + 1) = 2 ?\tyes
(2 + 2) = 5 ?\tno
(3 + 1) = 4 ?\tyes
(2 * 3) = 7 ?\tno
(4 - 1) = 3 ?\tyes
(5 + 2) = 8 ?\tno
(6 / 2) = 3 ?\tyes
(3 * 3) = 6 ?\tno
";

const TARGETS: &str = "F\nH\nJ\nK\nL\nN\nP\nQ\n";

const RESPONSE_TIME: Duration = Duration::from_millis(500);

/// Terminal-free host with a clock that only moves when told to.
#[derive(Default)]
struct HeadlessHost {
    clock: Duration,
    timers: TimerQueue,
    screen: String,
    input_enabled: bool,
    input: String,
}

impl Host for HeadlessHost {
    fn display(&mut self, text: &str, _align: Align) {
        self.screen = text.to_string();
    }
    fn enable_text_input(&mut self) {
        self.input_enabled = true;
    }
    fn disable_text_input(&mut self) {
        self.input_enabled = false;
    }
    fn read_text_input(&self) -> String {
        self.input.clone()
    }
    fn clear_text_input(&mut self) {
        self.input.clear();
    }
    fn schedule(&mut self, delay: Duration) -> TimerId {
        self.timers.schedule(self.clock, delay)
    }
    fn cancel(&mut self, timer: TimerId) {
        self.timers.cancel(timer);
    }
    fn now(&self) -> Duration {
        self.clock
    }
}

/// Answers every processing item correctly except the first one shown
/// under a deadline, which is left to time out, and recalls every list
/// perfectly.
struct Participant {
    answers: BTreeMap<String, char>,
    targets: BTreeSet<String>,
    seen_targets: Vec<String>,
    let_one_time_out: bool,
}

impl Participant {
    fn new(config: &Config) -> Self {
        let answers = PROCESSING
            .lines()
            .filter_map(|line| line.split_once('\t'))
            .map(|(prompt, label)| (prompt.to_string(), config.responses[label]))
            .collect();
        let targets = TARGETS.lines().map(str::to_string).collect();
        Self {
            answers,
            targets,
            seen_targets: Vec::new(),
            let_one_time_out: true,
        }
    }

    fn act(&mut self, host: &mut HeadlessHost) -> Input {
        if self.targets.contains(&host.screen) && self.seen_targets.last() != Some(&host.screen) {
            self.seen_targets.push(host.screen.clone());
        }

        if host.input_enabled {
            host.input = self.seen_targets.join(" ");
            self.seen_targets.clear();
            return Input::Submit;
        }

        let deadline_pending = host.timers.next_deadline().is_some();
        if let Some(&key) = self.answers.get(&host.screen) {
            if deadline_pending && self.let_one_time_out {
                self.let_one_time_out = false;
                return fire_next(host);
            }
            host.clock += RESPONSE_TIME;
            return Input::Key(key);
        }
        if deadline_pending {
            return fire_next(host);
        }
        Input::Key(' ')
    }
}

fn fire_next(host: &mut HeadlessHost) -> Input {
    let deadline = host.timers.next_deadline().unwrap();
    host.clock = host.clock.max(deadline);
    Input::Timer(host.timers.pop_due(host.clock).unwrap())
}

fn small_config(dir: &TempDir) -> Config {
    let processing = dir.path().join("processing.tsv");
    let targets = dir.path().join("targets.txt");
    fs::write(&processing, PROCESSING).unwrap();
    fs::write(&targets, TARGETS).unwrap();

    Config {
        processing_items_file: Some(processing),
        target_items_file: Some(targets),
        practice_processing_items: 3,
        measure_time_after_trial: 1,
        practice_levels: vec![2],
        practice_items_per_level: 1,
        levels: vec![2, 3],
        items_per_level: 1,
        time_out_factor: 2.0,
        response_display_time: 500,
        target_display_time: 800,
        time_out_notice_time: 300,
        ..Config::default()
    }
}

#[test]
fn full_run_writes_report() {
    let dir = TempDir::new().unwrap();
    let config = small_config(&dir);

    let processing_pool =
        ItemPool::load(config.processing_items_path().as_deref(), BUNDLED_PROCESSING_ITEMS).unwrap();
    let processing_items = processing_pool.processing_items().unwrap();
    let targets = ItemPool::load(config.target_items_path().as_deref(), BUNDLED_TARGETS).unwrap();
    config
        .validate(&processing_pool, &processing_items, &targets)
        .unwrap();

    let results_path = dir.path().join("p01.tsv");
    let results = ResultsFile::create(&results_path, "p01", &config).unwrap();

    let mut rng = SmallRng::seed_from_u64(42);
    let material = Material::new(
        processing_items,
        &targets,
        config.pseudo_random_targets,
        SmallRng::seed_from_u64(7),
    );
    let mut chain = ScriptChain::new(standard_script(&config, &mut rng), material);
    let mut host = HeadlessHost::default();
    let mut participant = Participant::new(&config);

    let mut outcome = chain.start(&mut host).unwrap();
    let mut steps = 0;
    let options = loop {
        if let Dispatch::Finished(options) = outcome {
            break options;
        }
        steps += 1;
        assert!(steps < 500, "run did not finish; stuck on {:?}", host.screen);
        let input = participant.act(&mut host);
        outcome = chain.dispatch(input, &mut host).unwrap();
    };
    results.append_report(&options).unwrap();

    assert!(chain.is_finished());
    assert_eq!(host.screen, config.good_bye_text);
    assert_eq!(chain.dispatch(Input::Key(' '), &mut host).unwrap(), Dispatch::Idle);

    // Practice onsets are 1000 ms apart, so the estimate has no spread.
    assert_eq!(options.time_out_ms, Some(1000));

    let report = ResultsFile::read_report(&results_path).unwrap();
    assert_eq!(report.subject.as_deref(), Some("p01"));
    assert_eq!(report.results, options.results);
    assert_eq!(report.pcu, Some(1.0));

    let phases: Vec<&str> = report.results.iter().map(|r| r.phase.as_str()).collect();
    assert_eq!(phases, ["practice", "test", "test"]);

    let practice = &report.results[0];
    assert_eq!(practice.level, 2);
    assert_eq!(practice.recalled, 2);
    assert_eq!(practice.verified, 1);
    assert_eq!(practice.mean_rt_ms, 750);
    assert_eq!(practice.max_rt_ms, 1000);

    let mut test_levels: Vec<usize> = report.results[1..].iter().map(|r| r.level).collect();
    test_levels.sort_unstable();
    assert_eq!(test_levels, [2, 3]);
    for row in &report.results[1..] {
        assert_eq!(row.recalled, row.level);
        assert_eq!(row.verified, row.level);
        assert_eq!(row.mean_rt_ms, 500);
        assert_eq!(row.entered, row.presented);
        assert!(row.presented.iter().all(|t| t.len() == 1));
    }
    let set_ids: Vec<usize> = report.results[1..].iter().map(|r| r.set_id).collect();
    assert_eq!(set_ids, [1, 2]);
}

#[test]
fn missing_item_file_is_reported_before_the_run() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        processing_items_file: Some(dir.path().join("absent.tsv")),
        ..Config::default()
    };
    assert!(ItemPool::load(config.processing_items_path().as_deref(), BUNDLED_PROCESSING_ITEMS).is_err());
}

#[test]
fn bundled_material_satisfies_default_config() {
    let config = Config::default();
    let processing_pool = ItemPool::load(None, BUNDLED_PROCESSING_ITEMS).unwrap();
    let processing_items = processing_pool.processing_items().unwrap();
    let targets = ItemPool::load(None, BUNDLED_TARGETS).unwrap();
    let warnings = config
        .validate(&processing_pool, &processing_items, &targets)
        .unwrap();
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
}
