/// フィードバックサイクルの状態
///
/// 書き込むのはトリガ (fire/finish/invalidate) と 1Hz カウントダウン
/// (tick_second) のみ。判定はフレーム時刻ベースで決定的に行い、
/// cooldown_remaining_secs はUI向けの観測値。
#[derive(Debug)]
pub struct FeedbackCycle {
    last_feedback_at_ms: Option<f64>,
    cooldown_remaining_secs: u32,
    in_flight: bool,
    generation: u64,
}

impl FeedbackCycle {
    pub fn new() -> Self {
        Self {
            last_feedback_at_ms: None,
            cooldown_remaining_secs: 0,
            in_flight: false,
            generation: 0,
        }
    }

    /// 新しいフィードバック要求を出せる状態か
    ///
    /// 要求が飛行中の間は常に false (単一スロットガード)。
    /// 一度も発火していなければ即座に true。
    pub fn ready(&self, now_ms: f64, interval_secs: u32) -> bool {
        if self.in_flight {
            return false;
        }
        match self.last_feedback_at_ms {
            None => true,
            Some(last) => now_ms - last >= interval_secs as f64 * 1000.0,
        }
    }

    /// 発火を記録し、要求に付ける世代タグを返す
    pub fn fire(&mut self, now_ms: f64, interval_secs: u32) -> u64 {
        self.last_feedback_at_ms = Some(now_ms);
        self.cooldown_remaining_secs = interval_secs;
        self.in_flight = true;
        self.generation
    }

    /// 飛行中の要求の完了を記録する
    ///
    /// 世代が一致すれば in_flight を解除して true。
    /// 不一致 (完了前に種別/モデルが切り替わった) なら状態を変えず false。
    pub fn finish(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.in_flight = false;
        true
    }

    /// 種別/モデル切替時の無効化
    ///
    /// 世代を進めて飛行中の応答を失効させ、クールダウンを解除して
    /// 即発火可能な状態に戻す。
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.in_flight = false;
        self.last_feedback_at_ms = None;
        self.cooldown_remaining_secs = 0;
    }

    /// 1秒ごとのカウントダウン (飽和減算)
    pub fn tick_second(&mut self) {
        self.cooldown_remaining_secs = self.cooldown_remaining_secs.saturating_sub(1);
    }

    pub fn cooldown_remaining_secs(&self) -> u32 {
        self.cooldown_remaining_secs
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Default for FeedbackCycle {
    fn default() -> Self {
        Self::new()
    }
}
