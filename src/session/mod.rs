/// Root composition object wiring store, clock, compositor and storage.
pub mod editor;
