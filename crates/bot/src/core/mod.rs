pub mod aggregator;
pub mod alert;
pub mod clock;
pub mod cooldown;
pub mod decision;
pub mod guards;
pub mod indicators;
pub mod regime;
pub mod scanner;
