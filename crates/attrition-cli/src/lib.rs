pub mod inspect;
pub mod train;
pub mod util;
