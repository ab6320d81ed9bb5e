pub mod results_file;
