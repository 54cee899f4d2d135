use nalgebra::Point3;

/// 3点 a-b-c が頂点 b でなす内角を度数で返す (0〜180)
///
/// ベクトル ab, cb の余弦から計算する。どちらかのベクトルが
/// 縮退している (同一点) 場合は角度が定義できないため None。
pub fn joint_angle(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Option<f32> {
    let ab = a - b;
    let cb = c - b;

    let norm_ab = ab.norm();
    let norm_cb = cb.norm();
    if norm_ab <= f32::EPSILON || norm_cb <= f32::EPSILON {
        return None;
    }

    // 浮動小数の誤差で |cos| が 1 を僅かに超えることがあるためクランプ
    let cos = (ab.dot(&cb) / (norm_ab * norm_cb)).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}
