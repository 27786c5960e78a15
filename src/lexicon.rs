use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

/// Immutable lexicon tables, built once at startup and shared read-only by
/// every pipeline stage.
///
/// Three tables:
/// - `abbreviations`: informal Indonesian surface -> Chinese gloss or
///   canonical Indonesian form, matched case-insensitively, longest surface
///   first.
/// - `vocab_zh_id`: Chinese phrase -> Indonesian gloss, used for glossary
///   excerpts on the zh->id direction.
/// - `polish_rules`: ordered literal substitutions for Chinese output.
pub struct Lexicon {
    /// Sorted by descending surface byte length so prefix surfaces ("sm")
    /// never shadow longer ones ("sm2").
    abbreviations: Vec<(String, String)>,
    abbrev_index: HashMap<String, String>,
    vocab_zh_id: Vec<(String, String)>,
    polish_rules: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct PolishFile {
    #[serde(default)]
    rule: Vec<PolishRule>,
}

#[derive(Debug, Deserialize)]
struct PolishRule {
    from: String,
    to: String,
}

impl Lexicon {
    /// Lexicon with the built-in tables only.
    pub fn builtin() -> Self {
        Self::assemble(
            builtin::ABBREVIATIONS
                .iter()
                .map(|(s, c)| (s.to_string(), c.to_string()))
                .collect(),
            builtin::VOCAB_ZH_ID
                .iter()
                .map(|(s, c)| (s.to_string(), c.to_string()))
                .collect(),
            builtin::POLISH_RULES
                .iter()
                .map(|(s, c)| (s.to_string(), c.to_string()))
                .collect(),
        )
    }

    /// Built-in tables plus optional TOML overrides.
    ///
    /// Abbreviation and vocab files are flat `surface = "canonical"` tables
    /// merged over the built-ins (later wins). A polish file replaces the
    /// built-in rule list entirely, since rule order is significant.
    pub fn with_overrides(
        abbreviations: Option<&Path>,
        vocab: Option<&Path>,
        polish: Option<&Path>,
    ) -> anyhow::Result<Self> {
        let mut abbrev: HashMap<String, String> = builtin::ABBREVIATIONS
            .iter()
            .map(|(s, c)| (s.to_string(), c.to_string()))
            .collect();
        if let Some(path) = abbreviations {
            for (s, c) in load_table(path)? {
                abbrev.insert(s.to_lowercase(), c);
            }
        }

        let mut vocab_map: HashMap<String, String> = builtin::VOCAB_ZH_ID
            .iter()
            .map(|(s, c)| (s.to_string(), c.to_string()))
            .collect();
        if let Some(path) = vocab {
            for (s, c) in load_table(path)? {
                vocab_map.insert(s, c);
            }
        }

        let polish_rules: Vec<(String, String)> = match polish {
            None => builtin::POLISH_RULES
                .iter()
                .map(|(s, c)| (s.to_string(), c.to_string()))
                .collect(),
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("read polish rules: {}", path.display()))?;
                let file: PolishFile = toml::from_str(&text)
                    .with_context(|| format!("parse polish rules: {}", path.display()))?;
                file.rule.into_iter().map(|r| (r.from, r.to)).collect()
            }
        };

        Ok(Self::assemble(
            abbrev.into_iter().collect(),
            vocab_map.into_iter().collect(),
            polish_rules,
        ))
    }

    fn assemble(
        abbreviations: Vec<(String, String)>,
        vocab_zh_id: Vec<(String, String)>,
        polish_rules: Vec<(String, String)>,
    ) -> Self {
        let mut abbreviations: Vec<(String, String)> = abbreviations
            .into_iter()
            .map(|(s, c)| (s.trim().to_lowercase(), c.trim().to_string()))
            .filter(|(s, c)| {
                let ok = !s.is_empty() && !c.is_empty();
                if !ok {
                    warn!("skipping empty lexicon entry");
                }
                ok
            })
            .collect();
        abbreviations.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        let abbrev_index = abbreviations
            .iter()
            .map(|(s, c)| (s.clone(), c.clone()))
            .collect();

        let vocab_zh_id = vocab_zh_id
            .into_iter()
            .filter(|(s, c)| !s.trim().is_empty() && !c.trim().is_empty())
            .collect();

        let polish_rules = polish_rules
            .into_iter()
            .filter(|(s, c)| !s.is_empty() && !c.is_empty())
            .collect();

        Self {
            abbreviations,
            abbrev_index,
            vocab_zh_id,
            polish_rules,
        }
    }

    /// Abbreviation pairs, longest surface first.
    pub fn abbreviations(&self) -> &[(String, String)] {
        &self.abbreviations
    }

    /// Exact (lowercased) surface-form membership, used as a classifier hint.
    pub fn is_id_surface(&self, token: &str) -> bool {
        self.abbrev_index.contains_key(token)
    }

    pub fn polish_rules(&self) -> &[(String, String)] {
        &self.polish_rules
    }

    /// Lexicon entries relevant to `text` for the given translation direction,
    /// longest surface first, capped at `max_items`. Used to build the
    /// glossary excerpt for the LLM provider.
    pub fn glossary_for_text<'a>(
        &'a self,
        text: &str,
        source_lang: &str,
        max_items: usize,
    ) -> Vec<(&'a str, &'a str)> {
        if max_items == 0 || text.is_empty() {
            return Vec::new();
        }
        let mut items: Vec<(&str, &str)> = if source_lang.starts_with("zh") {
            self.vocab_zh_id
                .iter()
                .filter(|(s, _)| text.contains(s.as_str()))
                .map(|(s, c)| (s.as_str(), c.as_str()))
                .collect()
        } else {
            let lowered = text.to_lowercase();
            self.abbreviations
                .iter()
                .filter(|(s, _)| lowered.contains(s.as_str()))
                .map(|(s, c)| (s.as_str(), c.as_str()))
                .collect()
        };
        items.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        items.truncate(max_items);
        items
    }

    /// Renders a glossary excerpt as plain prompt text.
    pub fn render_glossary(items: &[(&str, &str)]) -> String {
        if items.is_empty() {
            return String::new();
        }
        let mut out = String::new();
        out.push_str("GLOSSARY (follow these translations consistently):\n");
        for (src, tgt) in items {
            out.push_str("- ");
            out.push_str(src);
            out.push_str(" => ");
            out.push_str(tgt);
            out.push('\n');
        }
        out
    }
}

fn load_table(path: &Path) -> anyhow::Result<HashMap<String, String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read lexicon table: {}", path.display()))?;
    let table: HashMap<String, String> =
        toml::from_str(&text).with_context(|| format!("parse lexicon table: {}", path.display()))?;
    Ok(table)
}

mod builtin {
    /// Informal Indonesian -> Chinese gloss or canonical Indonesian form.
    ///
    /// Note: `jam` and the period words `pagi`/`siang`/`sore`/`malam` are
    /// deliberately absent. They are the keywords the time normalizer keys
    /// off, and the normalizer runs after expansion; rewriting any of them
    /// here would turn `jam 3 sore` into `jam 3 下午` and the period shift
    /// could never fire.
    pub(super) const ABBREVIATIONS: &[(&str, &str)] = &[
        // people
        ("ad", "弟弟"),
        ("adik", "弟弟"),
        ("kak", "哥哥"),
        ("ce", "姐姐"),
        ("cece", "姐姐"),
        ("ibu", "媽媽"),
        ("bpk", "先生"),
        ("ayah", "爸爸"),
        ("nenek", "奶奶"),
        ("kakek", "爺爺"),
        ("cucu", "孫子"),
        ("tmn", "朋友"),
        ("tm", "他們"),
        ("sy", "我"),
        ("aku", "我"),
        ("saya", "我"),
        ("kmu", "你"),
        ("km", "你"),
        ("anda", "您"),
        ("dy", "他/她"),
        ("dia", "他/她"),
        ("dya", "他/她"),
        // time words
        ("bsk", "明天"),
        ("besok", "明天"),
        ("kmrn", "昨天"),
        ("kemarin", "昨天"),
        ("td", "剛才"),
        ("tdi", "剛才"),
        ("nanti", "等一下"),
        ("udh", "已經"),
        ("sudah", "已經"),
        ("blm", "還沒"),
        ("belum", "還沒"),
        ("hr", "假期"),
        ("hari", "天"),
        ("pagi2", "早上早點"),
        ("siang2", "中午時候"),
        // care and daily actions
        ("makan", "吃"),
        ("mkn", "吃"),
        ("minum", "喝"),
        ("mandi", "洗澡"),
        ("mandikan", "幫洗澡"),
        ("ganti", "換"),
        ("tidur", "睡覺"),
        ("t", "tidur"),
        ("bangun", "起床"),
        ("temani", "陪"),
        ("pulang", "回家"),
        ("bantu", "幫忙"),
        ("rehabilitas", "復健"),
        ("bersih", "打掃"),
        ("cuci", "洗"),
        ("masak", "煮"),
        ("masaknya", "煮的"),
        ("masukan", "放進"),
        ("potong", "切"),
        ("lihat", "看見"),
        ("lihat2", "看看"),
        ("pegang", "拿著"),
        ("tutup", "關上"),
        ("buka", "打開"),
        // chat slang
        ("aj", "aja"),
        ("ajh", "aja"),
        ("aja", "就好"),
        ("deh", "就這樣吧"),
        ("bwt", "buat"),
        ("buat", "為了"),
        ("jg", "juga"),
        ("jgk", "juga"),
        ("jga", "juga"),
        ("jdi", "jadi"),
        ("jd", "jadi"),
        ("kl", "kalau"),
        ("klw", "kalau"),
        ("klo", "kalau"),
        ("krn", "karena"),
        ("karna", "karena"),
        ("iya", "ya"),
        ("lya", "ya"),
        ("yaudah", "好啦"),
        ("ywdh", "好啦"),
        ("ngga", "不"),
        ("ga", "不"),
        ("gk", "不"),
        ("nggak", "不"),
        ("nggaaa", "不"),
        ("gt", "gitu"),
        ("gtu", "gitu"),
        ("gitu", "那樣"),
        ("gtw", "不知道"),
        ("sm", "sama"),
        ("sm2", "sama-sama"),
        ("trs", "terus"),
        ("trus", "terus"),
        ("sja", "saja"),
        ("sllu", "selalu"),
        ("skrg", "現在"),
        ("dr", "醫生"),
        ("dok", "醫生"),
        ("tp", "tapi"),
        ("tpi", "tapi"),
        ("tapi", "但是"),
        ("ok", "好"),
        ("okee", "好喔"),
        ("okey", "好喔"),
        ("sip", "好"),
        ("mantap", "太棒了"),
        ("btw", "順便說一下"),
        // objects and places
        ("rumah", "家"),
        ("rmh", "家"),
        ("pintu", "門口"),
        ("dpn", "前面"),
        ("belakang", "後面"),
        ("mobil", "車"),
        ("motor", "摩托車"),
        ("uang", "錢"),
        ("sayur", "蔬菜"),
        ("beras", "米"),
        ("air", "水"),
        ("kursi", "椅子"),
        ("meja", "桌子"),
        ("dapur", "廚房"),
        ("kamar", "房間"),
        ("tempat tidur", "床"),
        ("jendela", "窗戶"),
        ("halaman", "院子"),
        // institutions
        ("bca", "銀行"),
        ("pt", "有限公司"),
        ("sd", "小學"),
        ("smp", "初中"),
        ("smk", "中等職業學校"),
        ("tk", "幼兒園"),
        ("rt", "居民社區"),
        ("rw", "社區範圍"),
        ("kkn", "社會服務"),
        ("tni", "印度尼西亞國軍"),
        ("polri", "印度尼西亞警察"),
        ("wfh", "在家工作"),
        ("wfo", "辦公室工作"),
        ("umkm", "微型企業"),
        ("wmm", "微型企業"),
        // misc
        ("faq", "常見問題"),
        ("bkn", "不是"),
        ("bsa", "bisa"),
        ("bisa", "可以"),
        ("saja", "就好"),
        ("karena", "因為"),
        ("krg", "少"),
        ("susa", "susah"),
        ("habis", "吃完"),
        ("selesai", "結束"),
        ("sayang", "親愛的"),
        ("syg", "親愛的"),
        ("gpp", "沒關係"),
        ("nd", "下屬"),
        ("orang", "人"),
        ("wkwk", "哈哈"),
        ("haha", "哈哈"),
        ("hehe", "呵呵"),
        ("loh", "呀"),
        ("lah", "啦"),
        ("nih", "這個"),
        ("dong", "啦"),
        ("kok", "怎麼會"),
        ("lohkok", "怎麼啦"),
        ("lho", "呢"),
        ("dehh", "就這樣吧"),
        ("bt", "生氣"),
        ("pd", "自信"),
        ("pls", "請"),
        ("thx", "謝謝"),
        ("makasih", "謝謝"),
        ("terima kasih", "謝謝"),
        ("okelah", "好吧"),
        ("gapapa", "沒事"),
        ("okeeh", "好喔"),
        ("mantul", "很棒"),
    ];

    /// Chinese phrase -> Indonesian gloss, for zh->id glossary hints.
    pub(super) const VOCAB_ZH_ID: &[(&str, &str)] = &[
        ("奶奶", "nenek"),
        ("白天", "siang hari"),
        ("有", "ada"),
        ("排便", "buang air besar"),
        ("多", "banyak"),
        ("很少", "sangat sedikit"),
        ("只有", "hanya"),
        ("一點點", "sedikit"),
        ("好", "bagus"),
        ("姐姐", "ce"),
        ("吃", "makan"),
        ("水果", "buah"),
        ("切", "potong"),
        ("小", "kecil"),
        ("可以", "bisa"),
        ("吃下", "dapat dimakan"),
        ("木瓜", "pepaya"),
        ("牛奶", "susu"),
        ("日期", "tanggal"),
        ("喝", "minum"),
        ("煮", "masak"),
        ("秋葵", "okra"),
        ("熟", "matang"),
        ("幫", "bantu"),
        ("拍", "ambil foto"),
        ("鍋子", "pot"),
        ("洗", "cuci"),
        ("盆子", "baskom"),
        ("瓦斯爐", "kompor gas"),
        ("布", "kain"),
        ("下午", "sore"),
        ("熱", "panas"),
        ("晚餐", "makan malam"),
        ("冰", "dingin"),
        ("蒸熟", "dikukus"),
        ("順序", "urutan"),
        ("午餐", "makan siang"),
        ("卡片", "kartu"),
        ("BPJS", "BPJS"),
        ("健保卡", "kartu asuransi kesehatan"),
        ("忘記", "lupa"),
        ("帶回家", "membawa pulang"),
        ("更新", "diperbarui"),
        ("換新單", "ubah pesanan baru"),
        ("快", "cepat"),
        ("回來", "kembali"),
        ("蓮霧", "apel lilin"),
        ("冰箱", "lemari es"),
        ("客廳", "ruang tamu"),
        ("桌子", "meja"),
        ("紅", "merah"),
        ("敬拜", "ibadah"),
        ("祈禱", "berdoa"),
        ("問", "tanya"),
        ("按摩", "pijat"),
        ("貓", "kucing"),
        ("颱風", "topan"),
        ("注意", "hati-hati"),
        ("大聲", "keras"),
        ("藥", "obat"),
        ("屁股", "pantat"),
        ("狀況", "situasi"),
        ("塞劑", "agen plugging"),
        ("水", "air"),
        ("開水", "air rebus"),
        ("下大雨", "hujan deras"),
        ("雨停", "hujan berhenti"),
        ("樓上", "lantai atas"),
        ("外面", "luar"),
        ("拿", "ambil"),
        ("水果剝", "kupas buah"),
        ("損壞", "rusak"),
        ("梨子", "pir"),
        ("香瓜", "melon"),
        ("圓形", "bulat"),
        ("吃完", "habis"),
        ("黑", "hitam"),
        ("紅菠菜", "bayam merah"),
        ("寄", "kirim"),
        ("箱", "kotak"),
        ("送", "antar"),
        ("今天", "hari ini"),
        ("明天", "besok"),
        ("簽收", "tanda tangan"),
        ("上次", "terakhir"),
        ("外箱", "kotak luar"),
        ("粉紅色", "merah muda"),
        ("下面", "di bawah"),
        ("還沒", "belum"),
        ("遵循", "mengikuti"),
        ("日期順序", "urutan tanggal"),
    ];

    /// Ordered longest-pattern-first so overlapping phrases resolve to the
    /// longer match.
    pub(super) const POLISH_RULES: &[(&str, &str)] = &[
        ("謝謝你", "謝謝。"),
        ("好的", "好。"),
        ("ok", "好。"),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_surface_first() {
        let lex = Lexicon::builtin();
        let abbrevs = lex.abbreviations();
        let pos_sm = abbrevs.iter().position(|(s, _)| s == "sm").unwrap();
        let pos_sm2 = abbrevs.iter().position(|(s, _)| s == "sm2").unwrap();
        assert!(pos_sm2 < pos_sm, "sm2 must be tried before sm");
    }

    #[test]
    fn no_empty_entries() {
        let lex = Lexicon::builtin();
        assert!(lex
            .abbreviations()
            .iter()
            .all(|(s, c)| !s.is_empty() && !c.is_empty()));
    }

    #[test]
    fn time_keywords_are_not_surface_forms() {
        let lex = Lexicon::builtin();
        for word in ["jam", "pagi", "siang", "sore", "malam"] {
            assert!(
                !lex.is_id_surface(word),
                "{word} must be left for the time normalizer"
            );
        }
    }

    #[test]
    fn surface_lookup_is_lowercase() {
        let lex = Lexicon::builtin();
        assert!(lex.is_id_surface("udh"));
        assert!(lex.is_id_surface("terima kasih"));
        assert!(!lex.is_id_surface("UDH"));
    }

    #[test]
    fn glossary_excerpt_matches_direction() {
        let lex = Lexicon::builtin();
        let id_items = lex.glossary_for_text("udh makan blm", "id", 10);
        assert!(id_items.iter().any(|(s, _)| *s == "makan"));

        let zh_items = lex.glossary_for_text("奶奶吃水果", "zh-TW", 10);
        assert!(zh_items.iter().any(|(s, c)| *s == "水果" && *c == "buah"));

        let rendered = Lexicon::render_glossary(&zh_items);
        assert!(rendered.contains("水果 => buah"));
    }

    #[test]
    fn glossary_capped() {
        let lex = Lexicon::builtin();
        let items = lex.glossary_for_text("udh makan blm jg sm aja deh", "id", 3);
        assert!(items.len() <= 3);
    }
}
