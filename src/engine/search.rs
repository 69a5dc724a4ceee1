// Agent Engine — Semantic Search Port
// In-process similarity search over a small seeded knowledge base. The
// first-aid tool queries this through the `Search` trait so tests can swap
// in a canned index.

use crate::atoms::error::AgentResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;

// ── Port ───────────────────────────────────────────────────────────────────

/// One scored hit from the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub metadata: Value,
    /// Similarity score in [0, 1]; higher is closer.
    pub similarity: f64,
}

/// Similarity search over indexed documents. Implementations must be cheap
/// to call per query; no network.
#[async_trait]
pub trait Search: Send + Sync {
    async fn search(&self, query: &str, top_k: usize) -> AgentResult<Vec<SearchHit>>;
}

// ── Embedded index ─────────────────────────────────────────────────────────

struct Document {
    text: String,
    metadata: Value,
}

/// Token-overlap index seeded with the first-aid knowledge base. Scoring is
/// |shared tokens| / |query tokens|, which keeps scores in [0, 1] without an
/// embedding model in the loop.
pub struct EmbeddedIndex {
    documents: Vec<Document>,
}

impl Default for EmbeddedIndex {
    fn default() -> Self {
        Self::with_first_aid_kb()
    }
}

impl EmbeddedIndex {
    pub fn new() -> Self {
        EmbeddedIndex { documents: Vec::new() }
    }

    pub fn add(&mut self, text: impl Into<String>, metadata: Value) {
        self.documents.push(Document { text: text.into().to_lowercase(), metadata });
    }

    /// Index pre-seeded with the built-in first-aid guidance entries.
    pub fn with_first_aid_kb() -> Self {
        let mut index = EmbeddedIndex::new();
        for (topic, steps) in FIRST_AID_KB {
            let text = format!("{} {}", topic, steps.join(" "));
            index.add(
                text,
                json!({
                    "topic": topic,
                    "steps": steps,
                    "source": "first_aid_kb",
                }),
            );
        }
        index
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn tokenize(text: &str) -> HashSet<&str> {
    text.split_whitespace().filter(|t| t.chars().count() > 2).collect()
}

#[async_trait]
impl Search for EmbeddedIndex {
    async fn search(&self, query: &str, top_k: usize) -> AgentResult<Vec<SearchHit>> {
        let lower = query.to_lowercase();
        let query_tokens = tokenize(&lower);
        if query_tokens.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<SearchHit> = self
            .documents
            .iter()
            .filter_map(|doc| {
                let doc_tokens = tokenize(&doc.text);
                let shared = query_tokens.intersection(&doc_tokens).count();
                if shared == 0 {
                    return None;
                }
                Some(SearchHit {
                    metadata: doc.metadata.clone(),
                    similarity: shared as f64 / query_tokens.len() as f64,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(top_k);
        Ok(hits)
    }
}

// ── Seeded first-aid knowledge base ────────────────────────────────────────

const FIRST_AID_KB: &[(&str, &[&str])] = &[
    (
        "kanama durdurma",
        &[
            "Yara üzerine temiz bir bezle doğrudan baskı uygulayın",
            "Kanayan bölgeyi kalp seviyesinin üzerinde tutun",
            "Baskıyı kanama durana kadar sürdürün",
            "Kanama durmuyorsa 112'yi arayın",
        ],
    ),
    (
        "yanık ilk yardım",
        &[
            "Yanık bölgeyi 10-20 dakika soğuk suyla soğutun",
            "Su toplamış bölgeleri patlatmayın",
            "Yanık üzerine buz, diş macunu veya yoğurt sürmeyin",
            "Geniş yanıklarda 112'yi arayın",
        ],
    ),
    (
        "kırık ve çıkık",
        &[
            "Kırık bölgeyi hareket ettirmeyin",
            "Bölgeyi sert bir cisimle sabitleyin",
            "Açık kırıklarda yarayı temiz bezle örtün",
            "Tıbbi yardım gelene kadar bekleyin",
        ],
    ),
    (
        "bayılma ve bilinç kaybı",
        &[
            "Kişiyi sırt üstü yatırın, ayaklarını yukarı kaldırın",
            "Sıkı giysileri gevşetin",
            "Nefes alıp almadığını kontrol edin",
            "Bilinç geri gelmiyorsa 112'yi arayın",
        ],
    ),
    (
        "deprem sırasında güvenlik",
        &[
            "Çök, kapan, tutun hareketini uygulayın",
            "Sağlam bir masa altına veya yaşam üçgeni oluşturabilecek eşya yanına geçin",
            "Pencere ve dış duvarlardan uzak durun",
            "Sarsıntı bitince binayı merdivenle terk edin",
        ],
    ),
    (
        "nefes darlığı ve boğulma",
        &[
            "Kişiyi sakinleştirin ve dik oturtun",
            "Boğazında cisim varsa Heimlich manevrası uygulayın",
            "Nefes durmuşsa kalp masajına başlayın",
            "Hemen 112'yi arayın",
        ],
    ),
];
