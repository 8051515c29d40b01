// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Notice queue with TTL + dedupe, fed by overlay frame and paint results.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use voxbrush_core::{FrameReport, PaintError, StrokeError};

/// How long frame/paint notices stay visible.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(4);

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Informational note.
    Info,
    /// Something degraded but the overlay kept going.
    Warn,
    /// A user action failed.
    Error,
}

/// Identifier for a notice entry.
pub type NoticeId = u64;

/// Notice data stored in the service.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    /// Stable identifier.
    pub id: NoticeId,
    /// Severity.
    pub kind: NoticeKind,
    /// Short title line.
    pub title: String,
    /// Optional body text.
    pub body: Option<String>,
    /// Time-to-live duration.
    pub ttl: Duration,
    /// Creation (or last refresh) time.
    pub created: Instant,
}

impl Notice {
    /// 1.0 when just created, 0.0 when expired.
    pub fn progress(&self, now: Instant) -> f32 {
        let age = now.saturating_duration_since(self.created).as_secs_f32();
        let ttl = self.ttl.as_secs_f32().max(f32::EPSILON);
        (1.0 - age / ttl).clamp(0.0, 1.0)
    }
}

/// Bounded in-memory notice queue.
///
/// Identical notices pushed within the dedupe window refresh the existing
/// entry instead of stacking, so a viewport that fails every frame shows up
/// once.
#[derive(Debug)]
pub struct NoticeService {
    queue: VecDeque<Notice>,
    max: usize,
    dedupe_window: Duration,
    next_id: NoticeId,
}

impl NoticeService {
    /// Create a new queue holding at most `max` notices.
    pub fn new(max: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            max: max.max(1),
            dedupe_window: Duration::from_millis(500),
            next_id: 1,
        }
    }

    /// Overrides the dedupe window.
    pub fn with_dedupe_window(mut self, window: Duration) -> Self {
        self.dedupe_window = window;
        self
    }

    /// Push a notice, refreshing an identical recent one if present.
    pub fn push<S, B>(
        &mut self,
        kind: NoticeKind,
        title: S,
        body: B,
        ttl: Duration,
        now: Instant,
    ) -> NoticeId
    where
        S: Into<String>,
        B: Into<Option<String>>,
    {
        let title = title.into();
        let body = body.into();

        if let Some(existing) = self.queue.iter_mut().find(|n| {
            n.kind == kind
                && n.title == title
                && n.body == body
                && now.saturating_duration_since(n.created) <= self.dedupe_window
        }) {
            existing.created = now;
            existing.ttl = ttl;
            return existing.id;
        }

        let id = self.next_id;
        self.next_id += 1;
        if self.queue.len() == self.max {
            self.queue.pop_front();
        }
        self.queue.push_back(Notice {
            id,
            kind,
            title,
            body,
            ttl,
            created: now,
        });
        id
    }

    /// One warning per viewport that was skipped or failed. Returns how many
    /// notices the report produced.
    pub fn record_frame(&mut self, report: &FrameReport, now: Instant) -> usize {
        let mut pushed = 0;
        for (id, err) in &report.skipped {
            self.push(
                NoticeKind::Warn,
                format!("{id} skipped"),
                Some(err.to_string()),
                DEFAULT_NOTICE_TTL,
                now,
            );
            pushed += 1;
        }
        for (id, err) in &report.failed {
            self.push(
                NoticeKind::Warn,
                format!("{id} failed to draw"),
                Some(err.to_string()),
                DEFAULT_NOTICE_TTL,
                now,
            );
            pushed += 1;
        }
        if report.renderer.is_none() {
            self.push(
                NoticeKind::Warn,
                "no overlay renderer selected",
                None,
                DEFAULT_NOTICE_TTL,
                now,
            );
            pushed += 1;
        }
        pushed
    }

    /// Surfaces a failed paint action.
    pub fn record_paint_error(&mut self, err: &PaintError, now: Instant) -> NoticeId {
        let title = match err {
            PaintError::Stroke(StrokeError::Capacity { .. }) => "stroke is full",
            PaintError::Stroke(StrokeError::NonFinite | StrokeError::OutOfRange) => {
                "pointer left the volume"
            }
            PaintError::StrokeGone(_) => "stroke was removed",
            PaintError::UnknownViewport(_) => "viewport is gone",
        };
        self.push(
            NoticeKind::Error,
            title,
            Some(err.to_string()),
            DEFAULT_NOTICE_TTL,
            now,
        )
    }

    /// Drop expired notices (call once per frame/tick).
    pub fn retain_visible(&mut self, now: Instant) {
        self.queue
            .retain(|n| now.saturating_duration_since(n.created) < n.ttl);
    }

    /// Notices still alive at `now`, oldest first.
    pub fn visible(&self, now: Instant) -> Vec<&Notice> {
        self.queue
            .iter()
            .filter(|n| now.saturating_duration_since(n.created) < n.ttl)
            .collect()
    }

    /// Number of stored notices, expired or not.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use voxbrush_core::{RenderStats, StrokeId, ViewportError, ViewportId, VOXEL_CAPACITY};

    #[test]
    fn identical_notices_within_window_collapse() {
        let mut svc = NoticeService::new(4);
        let t0 = Instant::now();
        let a = svc.push(NoticeKind::Info, "hi", None, Duration::from_secs(1), t0);
        let b = svc.push(
            NoticeKind::Info,
            "hi",
            None,
            Duration::from_secs(1),
            t0 + Duration::from_millis(100),
        );
        assert_eq!(a, b);
        assert_eq!(svc.len(), 1);

        let c = svc.push(
            NoticeKind::Info,
            "hi",
            None,
            Duration::from_secs(1),
            t0 + Duration::from_secs(2),
        );
        assert_ne!(a, c);
    }

    #[test]
    fn queue_is_bounded_and_expires() {
        let mut svc = NoticeService::new(2);
        let t0 = Instant::now();
        for title in ["a", "b", "c"] {
            svc.push(NoticeKind::Warn, title, None, Duration::from_secs(1), t0);
        }
        let titles: Vec<_> = svc.visible(t0).iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["b", "c"]);

        let later = t0 + Duration::from_secs(2);
        assert!(svc.visible(later).is_empty());
        svc.retain_visible(later);
        assert!(svc.is_empty());
    }

    #[test]
    fn frame_report_faults_become_warnings() {
        let mut svc = NoticeService::new(8);
        let report = FrameReport {
            renderer: Some("boxes".into()),
            rendered: vec![(ViewportId(0), RenderStats::default())],
            skipped: vec![(
                ViewportId(1),
                ViewportError::DegenerateGeometry {
                    width: 0,
                    height: 10,
                },
            )],
            failed: vec![],
        };
        let now = Instant::now();
        assert_eq!(svc.record_frame(&report, now), 1);
        // Same fault next frame refreshes instead of stacking.
        assert_eq!(svc.record_frame(&report, now + Duration::from_millis(16)), 1);
        let visible = svc.visible(now + Duration::from_millis(16));
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].kind, NoticeKind::Warn);
        assert_eq!(visible[0].title, "viewport#1 skipped");
    }

    #[test]
    fn clean_frame_is_silent() {
        let mut svc = NoticeService::new(8);
        let report = FrameReport {
            renderer: Some("lines".into()),
            ..FrameReport::default()
        };
        assert_eq!(svc.record_frame(&report, Instant::now()), 0);
        assert!(svc.is_empty());
    }

    #[test]
    fn paint_errors_are_errors() {
        let mut svc = NoticeService::new(8);
        let now = Instant::now();
        svc.record_paint_error(
            &PaintError::Stroke(StrokeError::Capacity {
                capacity: VOXEL_CAPACITY,
            }),
            now,
        );
        svc.record_paint_error(&PaintError::StrokeGone(StrokeId(3)), now);
        svc.record_paint_error(&PaintError::Stroke(StrokeError::OutOfRange), now);
        let visible = svc.visible(now);
        assert_eq!(visible.len(), 3);
        assert!(visible.iter().all(|n| n.kind == NoticeKind::Error));
        assert_eq!(visible[0].title, "stroke is full");
        assert_eq!(visible[2].title, "pointer left the volume");
    }

    #[test]
    fn progress_runs_from_one_to_zero() {
        let mut svc = NoticeService::new(1);
        let t0 = Instant::now();
        svc.push(NoticeKind::Info, "x", None, Duration::from_secs(2), t0);
        let n = svc.visible(t0)[0].clone();
        assert!((n.progress(t0) - 1.0).abs() < 1e-6);
        assert!((n.progress(t0 + Duration::from_secs(1)) - 0.5).abs() < 1e-3);
        assert_eq!(n.progress(t0 + Duration::from_secs(5)), 0.0);
    }
}
