//! External input contracts: grades table and model-answer JSON

pub mod cell;
pub mod grades;
pub mod model;

pub use cell::{parse_list_cell, CellValue};
pub use grades::{GradeBook, GradeRecord};
pub use model::{ModelAnswer, ModelAnswerSet};
