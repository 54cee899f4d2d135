/// コーチング対象の運動種別
///
/// 種別ごとに計測する関節とフィードバック文面が変わる
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExerciseKind {
    Squat,
    Lunge,
    LegRaise,
    LegExtension,
    HamstringCurl,
    /// 未知の種別名のフォールバック。汎用テンプレートで膝角度のみ計測
    Generic,
}

impl ExerciseKind {
    /// 既知の種別名のみ解決する。未知の名前は None
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "squat" => Some(Self::Squat),
            "lunge" => Some(Self::Lunge),
            "legraise" | "leg_raise" | "leg-raise" => Some(Self::LegRaise),
            "legextension" | "leg_extension" | "leg-extension" => Some(Self::LegExtension),
            "hamstringcurl" | "hamstring_curl" | "hamstring-curl" => Some(Self::HamstringCurl),
            _ => None,
        }
    }

    /// 名前から解決。未知の名前は Generic にフォールバック
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or(Self::Generic)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Squat => "squat",
            Self::Lunge => "lunge",
            Self::LegRaise => "leg_raise",
            Self::LegExtension => "leg_extension",
            Self::HamstringCurl => "hamstring_curl",
            Self::Generic => "generic",
        }
    }

    /// プロンプトに埋め込む英語の運動名
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Squat => "squat",
            Self::Lunge => "lunge",
            Self::LegRaise => "straight leg raise",
            Self::LegExtension => "seated leg extension",
            Self::HamstringCurl => "hamstring curl",
            Self::Generic => "lower-body exercise",
        }
    }
}
