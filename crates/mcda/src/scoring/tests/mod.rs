mod common;
mod hierarchical;
