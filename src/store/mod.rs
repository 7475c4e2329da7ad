pub(crate) mod canvas_store;
pub(crate) mod history;
pub(crate) mod state;
