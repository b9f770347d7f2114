pub mod param_parser;
pub mod sample_points;
pub mod write_to_csv;
