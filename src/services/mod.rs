pub(crate) mod certificates;
pub(crate) mod learning;
pub(crate) mod progression;
pub(crate) mod quiz_scoring;
