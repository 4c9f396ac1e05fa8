//! Video URL recognition
//!
//! Classifies the URL attached to a document so the embedding player can
//! pick a source: YouTube ids, Coursera lectures (with download and
//! subtitle URL derivation), or a direct media URL.

use once_cell::sync::Lazy;
use regex::Regex;

static YOUTUBE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*)")
        .expect("youtube url pattern")
});

static COURSERA_LECTURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https://class\.coursera\.org/([a-z0-9-]+)/lecture/(?:download\.mp4\?lecture_id=)?(\d+)$",
    )
    .expect("coursera lecture pattern")
});

/// Extract the 11-character YouTube video id from any of the usual URL
/// forms (`watch?v=`, `youtu.be/`, `embed/`, ...).
#[must_use]
pub fn youtube_video_id(url: &str) -> Option<&str> {
    let id = YOUTUBE_URL.captures(url)?.get(1)?.as_str();
    (id.len() == 11).then_some(id)
}

/// A Coursera lecture reference parsed from a class URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseraLecture {
    pub course: String,
    pub lecture_id: String,
}

impl CourseraLecture {
    /// Parse a `class.coursera.org` lecture URL (either the page URL or an
    /// already-rewritten download URL).
    #[must_use]
    pub fn parse(url: &str) -> Option<Self> {
        let captures = COURSERA_LECTURE.captures(url)?;
        Some(Self {
            course: captures.get(1)?.as_str().to_owned(),
            lecture_id: captures.get(2)?.as_str().to_owned(),
        })
    }

    /// Direct mp4 download URL for this lecture.
    #[must_use]
    pub fn download_url(&self) -> String {
        format!(
            "https://class.coursera.org/{}/lecture/download.mp4?lecture_id={}",
            self.course, self.lecture_id
        )
    }

    /// English SRT subtitles URL for this lecture.
    #[must_use]
    pub fn subtitles_url(&self) -> String {
        format!(
            "https://class.coursera.org/{}/lecture/subtitles?q={}_en&format=srt",
            self.course, self.lecture_id
        )
    }
}

/// Classified video source for a document's `video` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    YouTube { id: String },
    Coursera(CourseraLecture),
    /// Anything else is handed to the player as-is.
    Direct,
}

impl VideoSource {
    #[must_use]
    pub fn detect(url: &str) -> Self {
        if let Some(lecture) = CourseraLecture::parse(url) {
            return VideoSource::Coursera(lecture);
        }
        if let Some(id) = youtube_video_id(url) {
            return VideoSource::YouTube { id: id.to_owned() };
        }
        VideoSource::Direct
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_watch_url() {
        assert_eq!(
            youtube_video_id("http://www.youtube.com/watch?v=U6FvJ6jMGHU"),
            Some("U6FvJ6jMGHU")
        );
    }

    #[test]
    fn youtube_short_url() {
        assert_eq!(
            youtube_video_id("https://youtu.be/U6FvJ6jMGHU"),
            Some("U6FvJ6jMGHU")
        );
    }

    #[test]
    fn youtube_embed_url() {
        assert_eq!(
            youtube_video_id("https://www.youtube.com/embed/U6FvJ6jMGHU?rel=0"),
            Some("U6FvJ6jMGHU")
        );
    }

    #[test]
    fn youtube_rejects_short_ids() {
        assert_eq!(youtube_video_id("https://youtu.be/short"), None);
    }

    #[test]
    fn youtube_rejects_unrelated_urls() {
        assert_eq!(youtube_video_id("https://example.com/video.mp4"), None);
    }

    #[test]
    fn coursera_page_url() {
        let lecture =
            CourseraLecture::parse("https://class.coursera.org/ml-003/lecture/42").unwrap();
        assert_eq!(lecture.course, "ml-003");
        assert_eq!(lecture.lecture_id, "42");
        assert_eq!(
            lecture.download_url(),
            "https://class.coursera.org/ml-003/lecture/download.mp4?lecture_id=42"
        );
        assert_eq!(
            lecture.subtitles_url(),
            "https://class.coursera.org/ml-003/lecture/subtitles?q=42_en&format=srt"
        );
    }

    #[test]
    fn coursera_download_url_round_trips() {
        let lecture = CourseraLecture::parse(
            "https://class.coursera.org/ml-003/lecture/download.mp4?lecture_id=42",
        )
        .unwrap();
        assert_eq!(CourseraLecture::parse(&lecture.download_url()), Some(lecture));
    }

    #[test]
    fn detect_classifies_sources() {
        assert_eq!(
            VideoSource::detect("http://www.youtube.com/watch?v=U6FvJ6jMGHU"),
            VideoSource::YouTube {
                id: "U6FvJ6jMGHU".into()
            }
        );
        assert!(matches!(
            VideoSource::detect("https://class.coursera.org/ml-003/lecture/42"),
            VideoSource::Coursera(_)
        ));
        assert_eq!(
            VideoSource::detect("https://example.com/talk.mp4"),
            VideoSource::Direct
        );
    }
}
