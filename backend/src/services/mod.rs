pub mod back_checks;
pub mod export;
pub mod form;
