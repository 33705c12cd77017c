pub mod observation;
pub mod series;
pub mod summary;

pub use observation::*;
pub use series::*;
pub use summary::*;
