/// How a caption track was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    /// Uploaded or edited by the channel.
    Manual,
    /// Automatic speech recognition.
    Generated,
}

/// One caption track listed for a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    pub lang_code: String,
    /// Track name; empty for the default track of a language.
    pub name: String,
    pub kind: TrackKind,
}

/// A timed caption line.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionSegment {
    pub start_secs: f64,
    pub duration_secs: f64,
    pub text: String,
}
