//! Source Validator: probing and precondition checks of the source files.

mod probe;
mod validator;

pub use probe::{parse_probe_output, AudioProber, FfprobeProber, ProbeError, ProbeInfo};
#[cfg(feature = "mock")]
pub use probe::MockAudioProber;
pub use validator::{
    analyze, is_eligible_for_flac16, is_mp3_incompatible, AnalyzedFile, RequiredTag,
    ENCODING_24BIT_LOSSLESS,
};
