mod backend;
pub(crate) use backend::*;
