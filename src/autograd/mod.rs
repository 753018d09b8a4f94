pub mod tape;

pub use tape::{Tape, Var};
