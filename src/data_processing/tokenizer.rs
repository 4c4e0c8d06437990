// The Tokenizer trait is the seam between raw review text and the unigram id
// sequences fed to the n-gram augmenter. The concrete implementation wraps
// the pretrained BERT cased tokenizer from the `tokenizers` crate; its
// vocabulary size defines the unigram id space of the whole pipeline.

pub trait Tokenizer: Send + Sync {
    /// Converts a text string into a sequence of unigram token ids.
    fn encode(&self, value: &str) -> Vec<usize>;

    /// Converts a sequence of token ids back into a text string.
    fn decode(&self, tokens: &[usize]) -> String;

    /// Number of distinct unigram ids the tokenizer can produce.
    fn vocab_size(&self) -> usize;

    /// Id used to pad sequences to a common length within a batch.
    fn pad_token(&self) -> usize;
}

/// Tokenizer backed by the pretrained `bert-base-cased` model.
pub struct BertCasedTokenizer {
    tokenizer: tokenizers::Tokenizer,
}

impl Default for BertCasedTokenizer {
    fn default() -> Self {
        Self {
            tokenizer: tokenizers::Tokenizer::from_pretrained("bert-base-cased", None).unwrap(),
        }
    }
}

impl Tokenizer for BertCasedTokenizer {
    fn encode(&self, value: &str) -> Vec<usize> {
        let tokens = self.tokenizer.encode(value, true).unwrap();
        tokens.get_ids().iter().map(|t| *t as usize).collect()
    }

    fn decode(&self, tokens: &[usize]) -> String {
        let tokens = tokens.iter().map(|t| *t as u32).collect::<Vec<u32>>();
        self.tokenizer.decode(&tokens, false).unwrap()
    }

    fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(true)
    }

    fn pad_token(&self) -> usize {
        self.tokenizer.token_to_id("[PAD]").unwrap() as usize
    }
}
