pub mod back_check;
pub mod form;
pub mod species;
