#![allow(dead_code)]

mod error;
mod extractors;
mod modality;
mod registry;
mod sop;
mod util;

pub use error::{Error, Result};
pub use modality::Modality;
pub use registry::{
    ComputedField, ExtractedFields, ModalityExtractor, ModalityRegistry, Value, BASE_TAGS,
};
pub use sop::Sop;
pub use util::{
    from_seq, from_seq_opt, to_f64, to_f64_opt, to_f64s_opt, to_int_opt, to_string, to_string_opt,
    to_strings_opt,
};
