//! Text lexicon input
//!
//! Lexicons are plain text, one word per line.  Lines starting with `#` are
//! comments.  Only the first whitespace delimited token of a line is read.
//! Tokens are uppercased before insertion; tokens with letters outside A-Z,
//! or longer than `MAX_WORD_LENGTH`, are skipped with a warning.

use std::io::BufRead;
use crate::trie::Trie;
use crate::dawg;
use crate::DYNERR;

/// Add every word in a text lexicon file to the trie.  Returns the number
/// of words added.
pub fn add_words_from_file(trie: &mut Trie,file_name: &str) -> Result<u32,DYNERR> {
    let file = std::fs::File::open(file_name)?;
    add_words(trie,&mut std::io::BufReader::new(file))
}

/// Add every word from a line-oriented reader to the trie.  Returns the
/// number of words added.
pub fn add_words<R: BufRead>(trie: &mut Trie,reader: &mut R) -> Result<u32,DYNERR> {
    let mut count: u32 = 0;
    for line in reader.lines() {
        let line = line?;
        if line.starts_with('#') {
            continue;
        }
        let word = match line.split_whitespace().next() {
            Some(token) => token.to_ascii_uppercase(),
            None => continue
        };
        if word.len() > dawg::MAX_WORD_LENGTH {
            log::warn!("skipping overlong word {}",word);
            continue;
        }
        if !word.bytes().all(|b| (dawg::START_LETTER..=dawg::END_LETTER).contains(&b)) {
            log::warn!("skipping word with invalid letters {}",word);
            continue;
        }
        trie.add_word(&word)?;
        count += 1;
    }
    Ok(count)
}

#[test]
fn comments_and_bad_tokens_are_skipped() {
    let text = format!("# comment line\nBAT second token ignored\n\ncats\nNO-WAY\n{}\nFAT\n",
        "A".repeat(dawg::MAX_WORD_LENGTH + 1));
    let mut trie = Trie::new();
    let count = add_words(&mut trie,&mut std::io::Cursor::new(text.as_bytes())).expect("read failed");
    assert_eq!(count,3);
    assert_eq!(trie.get_diagnostics().num_words,3);
    assert_eq!(trie.get_diagnostics().num_word_letters,10);
}
