use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Preset {
    pub label: &'static str,
    pub value: &'static str,
}

pub const AUDIENCE_PRESETS: &[Preset] = &[
    Preset {
        label: "泛科技读者 (一般)",
        value: "泛科技读者, 背景知识一般, 关注点优先级: 行业应用 > 技术特性, 语气自然, 行话密度中",
    },
    Preset {
        label: "专业工程师 (深度)",
        value: "资深工程师, 背景知识专业, 关注点优先级: 技术特性 > 如何实现, 语气冷静客观, 行话密度高",
    },
    Preset {
        label: "小学老师 (入门)",
        value: "小学老师, 背景知识入门, 关注点优先级: 行业应用 > 技术特性, 语气亲切自然, 行话密度低",
    },
    Preset {
        label: "初中老师 (一般)",
        value: "初中老师, 背景知识一般, 关注点优先级: 行业应用 > 技术特性, 语气专业冷静, 行话密度中",
    },
    Preset {
        label: "高中老师 (专业)",
        value: "高中老师, 背景知识专业, 关注点优先级: 行业应用 > 技术特性, 语气专业冷静, 行话密度中",
    },
    Preset {
        label: "产品经理 (商业)",
        value: "产品经理, 背景知识一般, 关注点优先级: 市场与生态 > 行业应用, 语气专业冷静, 行话密度中",
    },
    Preset {
        label: "券商分析师 (严谨)",
        value: "券商分析师, 背景知识专业, 关注点优先级: 市场与生态 > 合规与风险, 语气专业冷静, 行话密度中",
    },
];

pub const LENGTH_PRESETS: &[Preset] = &[
    Preset { label: "500-800 字 (默认)", value: "500-800" },
    Preset { label: "≤ 500 字 (精简)", value: "≤500" },
    Preset { label: "800-1200 字 (深度)", value: "800-1200" },
];

pub fn default_audience() -> &'static str {
    AUDIENCE_PRESETS[0].value
}

pub fn default_length() -> &'static str {
    LENGTH_PRESETS[0].value
}
