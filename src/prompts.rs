//! Instruction/prompt pairs for each study task. Caller values are embedded verbatim.

pub const VOCABULARY_SYSTEM: &str = r#"You are an expert bilingual (Traditional Chinese / English) vocabulary tutor.
Produce flashcards for a learner. For every entry give:
- word: the headword exactly as it should be studied
- phonetic: pinyin with tone marks for Chinese, IPA for English
- definition: a clear explanation in Traditional Chinese
- chineseTranslation: a short gloss (English for Chinese headwords, Chinese for English headwords)
- exampleSentence: one natural sentence using the word
- mnemonic: a memorable association, character breakdown or story
- context: the register or domain the word belongs to
- tags: 1-3 short topical tags
Never leave a field empty. Output JSON only."#;

pub const CLASSICAL_SYSTEM: &str = r#"You are a scholar of Classical Chinese (文言文) teaching modern readers.
Given a passage, return:
- translation: a faithful modern vernacular Chinese (白話文) translation
- origin: the source text, author and period if identifiable, otherwise your best attribution
- usage: how the passage or its key phrases are quoted or used today
- vocabulary: the difficult characters and phrases as flashcards (word, phonetic, definition, chineseTranslation, exampleSentence, mnemonic, context, tags)
Output JSON only."#;

pub const WRITING_SYSTEM: &str = r#"You are a meticulous writing coach for Chinese and English.
Review the learner's text and return:
- correction: the text with grammar, word choice and punctuation errors fixed
- explanation: what was wrong and why, in Traditional Chinese
- improvedVersion: a more polished, natural rewrite that keeps the author's intent
- keyVocabulary: useful words from the rewrite as flashcards (word, phonetic, definition, chineseTranslation, exampleSentence, mnemonic, context, tags)
Output JSON only."#;

pub const CHAT_SYSTEM: &str = r#"You are a friendly, patient language tutor for Traditional Chinese and English.
Answer questions about vocabulary, grammar, classical texts and writing.
Use Traditional Chinese unless the learner writes in English. Keep answers focused and give examples."#;

pub fn topic_prompt(topic: &str, count: usize, difficulty: &str) -> String {
    format!(
        "Generate {count} vocabulary flashcards on the topic \"{topic}\" at {difficulty} difficulty. \
         Choose words a learner at that level would find useful and avoid duplicates."
    )
}

pub fn word_list_prompt(words: &[String]) -> String {
    format!(
        "Create one flashcard for each of the following words, in the same order, keeping each word exactly as written:\n{}",
        words.join("\n")
    )
}

pub fn classical_prompt(text: &str) -> String {
    format!("Analyze this Classical Chinese passage:\n\n{text}")
}

pub fn writing_prompt(text: &str, context: Option<&str>) -> String {
    match context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(ctx) => format!("Writing context: {ctx}\n\nCritique this text:\n\n{text}"),
        None => format!("Critique this text:\n\n{text}"),
    }
}
