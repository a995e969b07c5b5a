mod build;
mod input;
mod view;

pub(in crate::app) use input::PointerSnapshot;
