mod codec;

pub(crate) use codec::*;
