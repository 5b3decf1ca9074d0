mod common;
mod demos;
mod fail;
mod laws;
mod properties;
