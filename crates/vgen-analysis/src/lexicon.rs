//! Word lists and the noun lemmatizer used by the rule-based model.

/// English stop words.
pub const EN_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
    "with", "about", "against", "between", "into", "through", "during", "before", "after",
    "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
    "again", "further", "then", "once", "here", "there", "when", "where", "why", "how", "all",
    "any", "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not",
    "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will", "just", "don",
    "should", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "couldn", "didn",
    "doesn", "hadn", "hasn", "haven", "isn", "ma", "mightn", "mustn", "needn", "shan",
    "shouldn", "wasn", "weren", "won", "wouldn", "also", "would", "could", "may", "might",
    "must", "shall", "us", "let", "get", "got",
];

/// Characters dropped from CJK keyword candidates.
pub const CJK_STOP_CHARS: &[char] = &[
    '的', '了', '和', '是', '在', '我', '有', '這', '個', '們', '中', '也', '為', '以', '到', '說',
    '著',
];

pub fn is_en_stopword(word: &str) -> bool {
    EN_STOPWORDS.contains(&word)
}

pub fn is_cjk_stop_token(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if CJK_STOP_CHARS.contains(&c))
}

const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("children", "child"),
    ("people", "person"),
    ("men", "man"),
    ("women", "woman"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("oxen", "ox"),
    ("lives", "life"),
    ("knives", "knife"),
    ("wives", "wife"),
    ("leaves", "leaf"),
    ("wolves", "wolf"),
    ("halves", "half"),
    ("shelves", "shelf"),
    ("analyses", "analysis"),
    ("crises", "crisis"),
    ("theses", "thesis"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
];

/// Words ending in `s` that are already singular.
const SINGULAR_S: &[&str] = &[
    "news", "series", "species", "physics", "mathematics", "economics", "politics", "lens",
    "bus", "gas", "plus", "yes", "this", "thus", "always", "perhaps", "whereas", "chaos",
    "canvas", "atlas", "bias", "alias", "status", "campus", "virus", "bonus", "focus",
];

/// Reduce an English noun to its singular form, in the spirit of a WordNet noun lookup.
/// Expects lower-case input.
pub fn lemmatize(word: &str) -> String {
    if let Some((_, lemma)) = IRREGULAR_PLURALS.iter().find(|(plural, _)| *plural == word) {
        return (*lemma).to_string();
    }
    if word.chars().count() <= 3 || SINGULAR_S.contains(&word) {
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    for suffix in ["sses", "shes", "ches", "xes", "zes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix('s') {
        return stem.to_string();
    }
    word.to_string()
}

/// Titles that introduce a person's name.
pub const HONORIFICS: &[&str] = &[
    "mr", "mrs", "ms", "miss", "dr", "prof", "professor", "sir", "madam", "president",
    "senator", "governor", "mayor", "ceo", "king", "queen", "prince", "princess",
];

/// Final words that mark an organization.
pub const ORG_SUFFIXES: &[&str] = &[
    "inc", "corp", "corporation", "ltd", "llc", "co", "company", "group", "bank", "university",
    "college", "institute", "association", "foundation", "agency", "ministry", "council",
    "committee", "party", "league", "federation", "society", "labs", "technologies", "systems",
    "airlines", "motors", "news", "times", "network",
];

/// Final words that mark a place.
pub const PLACE_SUFFIXES: &[&str] = &[
    "city", "county", "province", "state", "states", "river", "mountain", "mountains", "island",
    "islands", "street", "avenue", "valley", "lake", "bay", "sea", "ocean", "republic",
    "kingdom", "park", "desert", "coast", "district",
];

/// Well-known places, lower-cased.
pub const PLACES: &[&str] = &[
    "africa", "america", "asia", "australia", "beijing", "berlin", "brazil", "britain",
    "california", "canada", "china", "europe", "france", "germany", "hong kong", "india",
    "italy", "japan", "korea", "london", "los angeles", "macau", "mexico", "moscow",
    "new york", "paris", "russia", "san francisco", "shanghai", "singapore", "spain", "sydney",
    "taiwan", "texas", "tokyo", "toronto", "united kingdom", "united states", "washington",
];

/// Well-known places in Chinese script.
pub const CJK_PLACES: &[&str] = &[
    "中國", "中国", "香港", "澳門", "澳门", "台灣", "台湾", "北京", "上海", "廣州", "广州", "深圳",
    "台北", "日本", "東京", "东京", "美國", "美国", "英國", "英国", "法國", "法国", "德國", "德国",
    "歐洲", "欧洲", "亞洲", "亚洲", "非洲", "新加坡", "韓國", "韩国", "加拿大", "澳洲", "倫敦",
    "伦敦", "紐約", "纽约", "巴黎",
];

/// Suffixes of organization names in Chinese script.
pub const CJK_ORG_SUFFIXES: &[&str] = &[
    "公司", "集團", "集团", "大學", "大学", "銀行", "银行", "協會", "协会", "研究院", "研究所",
    "醫院", "医院", "政府", "委員會", "委员会", "基金會", "基金会",
];

/// Titles that follow a person's name in Chinese script.
pub const CJK_PERSON_TITLES: &[&str] = &[
    "先生", "女士", "小姐", "教授", "博士", "總統", "总统", "主席", "經理", "经理", "老師", "老师",
];
