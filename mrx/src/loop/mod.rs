mod r#loop;

pub use r#loop::{CollectLoop, CollectLoopHandle, Collector};
