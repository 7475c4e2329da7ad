/// Storage backends and the persistence subscriber.
pub mod storage;
