use crate::exercise::ExerciseKind;
use crate::feedback::summary::MotionSummary;

/// サマリからLLMへ送る英語プロンプトを組み立てる
///
/// 種別ごとのテンプレートに開始/終了角度 (小数1桁) を埋め込み、
/// 左右差が閾値を超える場合のみ非対称の指摘を加える。
pub fn build_prompt(summary: &MotionSummary, asymmetry_threshold_deg: f32) -> String {
    let label = measurement_label(summary.kind);
    let mut prompt = format!(
        "A patient is performing a {}. Over the last {:.1} seconds:\n",
        summary.kind.display_name(),
        summary.span_secs,
    );
    prompt.push_str(&format!(
        "- Left {}: started at {:.1}°, ended at {:.1}°\n",
        label, summary.left_start_deg, summary.left_end_deg,
    ));
    prompt.push_str(&format!(
        "- Right {}: started at {:.1}°, ended at {:.1}°\n",
        label, summary.right_start_deg, summary.right_end_deg,
    ));
    if let Some(drop) = summary.hip_drop {
        prompt.push_str(&format!(
            "- Hip midpoint moved down by {:.2} (model units, positive means lower)\n",
            drop,
        ));
    }
    if summary.asymmetry_deg() > asymmetry_threshold_deg {
        prompt.push_str(&format!(
            "The left and right sides differ by {:.1}° at the end of the window; the patient may be favoring one side, so point this out.\n",
            summary.asymmetry_deg(),
        ));
    }
    prompt.push_str(form_rule(summary.kind));
    prompt.push('\n');
    prompt.push_str(
        "As a physiotherapy expert, provide short corrective feedback if the form is not proper. \
         Otherwise, give positive reinforcement.",
    );
    prompt
}

fn measurement_label(kind: ExerciseKind) -> &'static str {
    match kind {
        ExerciseKind::LegRaise => "hip flexion angle",
        _ => "knee angle",
    }
}

/// 種別ごとのフォーム判定基準 (プロンプトに埋め込む)
fn form_rule(kind: ExerciseKind) -> &'static str {
    match kind {
        ExerciseKind::Squat => {
            "If the knees stay above 150 degrees, the patient is too upright. \
             If below 90 degrees, the squat is too deep."
        }
        ExerciseKind::Lunge => {
            "If the knees stay above 150 degrees, the lunge is too shallow. \
             The front knee should reach about 90 degrees without collapsing below 80 degrees."
        }
        ExerciseKind::LegRaise => {
            "If the hip flexion angle stays above 150 degrees, the leg is not raised far enough. \
             If it drops below 90 degrees, the raise is higher than necessary."
        }
        ExerciseKind::LegExtension => {
            "A full repetition should travel from about 90 degrees of flexion to nearly 170 degrees \
             of extension; a small range of motion means the extension is incomplete."
        }
        ExerciseKind::HamstringCurl => {
            "A full curl should bend the knee from near 170 degrees down to about 90 degrees; \
             a small range of motion means the curl is incomplete."
        }
        ExerciseKind::Generic => {
            "Comment on the range of motion and left/right symmetry of the movement."
        }
    }
}
