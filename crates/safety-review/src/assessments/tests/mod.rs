mod common;
mod scope;
