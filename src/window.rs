use std::collections::VecDeque;

use crate::pose::Pose;

/// デフォルトの窓幅 (ms)
pub const DEFAULT_WINDOW_MS: f64 = 10_000.0;

/// 1フレーム分の推論結果
///
/// タイムスタンプは単調増加するms。生成後は不変。
#[derive(Debug, Clone)]
pub struct Frame {
    pub timestamp_ms: f64,
    pub pose: Pose,
}

impl Frame {
    pub fn new(timestamp_ms: f64, pose: Pose) -> Self {
        Self { timestamp_ms, pose }
    }
}

/// 時間制限付きの追記専用フレームバッファ
///
/// 最新フレームのタイムスタンプを基準に、窓幅より古いフレームを
/// 先頭から捨てる。壁時計ではなくフレーム時刻で判定するため決定的。
/// 保持不変条件: latest.timestamp - frame.timestamp < window_ms
#[derive(Debug)]
pub struct FrameWindow {
    window_ms: f64,
    frames: VecDeque<Frame>,
}

impl FrameWindow {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            frames: VecDeque::new(),
        }
    }

    /// フレームを追加し、窓から外れた古いフレームを捨てる
    ///
    /// タイムスタンプが逆行するフレームは棄却して false を返す
    pub fn push(&mut self, frame: Frame) -> bool {
        if let Some(last) = self.frames.back() {
            if frame.timestamp_ms < last.timestamp_ms {
                tracing::debug!(
                    "out-of-order frame dropped: {} < {}",
                    frame.timestamp_ms,
                    last.timestamp_ms
                );
                return false;
            }
        }

        let cutoff = frame.timestamp_ms - self.window_ms;
        self.frames.push_back(frame);
        while let Some(front) = self.frames.front() {
            if front.timestamp_ms <= cutoff {
                self.frames.pop_front();
            } else {
                break;
            }
        }
        true
    }

    /// 全フレームを破棄する (フィードバックサイクル完了後に使う)
    pub fn reset(&mut self) {
        self.frames.clear();
    }

    /// 現在のフレーム列の防御的コピー
    pub fn snapshot(&self) -> Vec<Frame> {
        self.frames.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn first(&self) -> Option<&Frame> {
        self.frames.front()
    }

    pub fn last(&self) -> Option<&Frame> {
        self.frames.back()
    }

    /// 先頭から末尾までの経過時間 (ms)
    pub fn span_ms(&self) -> f64 {
        match (self.frames.front(), self.frames.back()) {
            (Some(first), Some(last)) => last.timestamp_ms - first.timestamp_ms,
            _ => 0.0,
        }
    }
}
