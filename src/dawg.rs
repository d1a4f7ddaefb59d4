//! On-disk DAWG format, writer and reader
//!
//! A DAWG file is a fixed 64 byte header followed by one packed 32 bit
//! record per node.  Byte order is little endian throughout.  Node 0 is the
//! root, node 1 is the forward word marker, node 2 is the reverse part word
//! marker; the entry points for queries are the child ids of nodes 1 and 2.
//! This positional layout is part of the format.
//!
//! `DawgWriter` accumulates records and writes the file, `Dawg` loads and
//! validates a file and answers membership queries.

use crate::{Error,DYNERR,STDRESULT};

// lexicon constants

pub const MAX_WORD_LENGTH: usize = 32; // lexicons should reject words longer than this

pub const WILDCARD_CHAR: u8 = b'?';
pub const MULTI_CHAR_MATCH_SYMBOL: u8 = b'*';
pub const NOT_MATCH_SYMBOL: u8 = b'^';

pub const START_LETTER: u8 = b'A';
pub const END_LETTER: u8 = b'Z';
pub const DEFAULT_LETTER: u8 = b' '; // used for the root only

pub const FORWARD_WORD_DAWG_SYMBOL: u8 = b'*';
pub const REVERSE_PARTWORD_DAWG_SYMBOL: u8 = b'<';

// format constants

pub const FORWARD_WORD_NODE_ID: u32 = 1;
pub const REVERSE_PARTWORD_NODE_ID: u32 = 2;
pub const MINIMUM_NUMBER_OF_NODES: u32 = 3;
/// child ids are stored in 22 bits
pub const MAX_NODE_ID: u32 = 0x3fffff;

pub const HEADER_LEXICON_NAME_LENGTH: usize = 32;
pub const HEADER_DATE_LENGTH: usize = 20;
pub const HEADER_SIZE: usize = 64;

const CHILD_ID_MASK: u32 = 0x3fffff;

/// One node record.  On disk this is 32 bits: bits 0..21 are the id of the
/// first child (0 means no child), bits 22..29 the letter, bit 30 the
/// terminal flag, bit 31 the last-child flag.
#[derive(Clone,Copy,PartialEq,Debug)]
pub struct DawgNode {
    pub child_node_id: u32,
    pub letter: u8,
    pub is_terminal: bool,
    pub is_last_child: bool
}

impl DawgNode {
    pub fn pack(&self) -> u32 {
        let mut val = self.child_node_id & CHILD_ID_MASK;
        val |= (self.letter as u32) << 22;
        if self.is_terminal {
            val |= 1 << 30;
        }
        if self.is_last_child {
            val |= 1 << 31;
        }
        val
    }
    pub fn unpack(val: u32) -> Self {
        Self {
            child_node_id: val & CHILD_ID_MASK,
            letter: ((val >> 22) & 0xff) as u8,
            is_terminal: val & (1 << 30) != 0,
            is_last_child: val & (1 << 31) != 0
        }
    }
}

/// Fixed layout file header.  The name is NUL padded; a name longer than 32
/// bytes is truncated with no terminator.  The date is an opaque NUL padded
/// string, written as "DD MonthName YYYY".
#[derive(Clone,Debug)]
pub struct DawgHeader {
    pub size: u32,
    pub num_nodes: u32,
    pub lexicon_name: [u8;HEADER_LEXICON_NAME_LENGTH],
    pub date: [u8;HEADER_DATE_LENGTH],
    pub num_words: u32
}

/// copy into a NUL padded fixed buffer, truncating silently
fn fill_padded(dest: &mut [u8],src: &[u8]) {
    let count = src.len().min(dest.len());
    dest[..count].copy_from_slice(&src[..count]);
}

fn trim_padding(buf: &[u8]) -> String {
    let end = buf.iter().position(|b| *b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).to_string()
}

impl DawgHeader {
    fn create(lexicon_name: &str,num_nodes: u32,num_words: u32) -> Self {
        let mut name = [0u8;HEADER_LEXICON_NAME_LENGTH];
        fill_padded(&mut name,lexicon_name.as_bytes());
        let mut date = [0u8;HEADER_DATE_LENGTH];
        let date_string = chrono::Local::now().format("%d %B %Y").to_string();
        fill_padded(&mut date,date_string.as_bytes());
        Self {
            size: HEADER_SIZE as u32,
            num_nodes,
            lexicon_name: name,
            date,
            num_words
        }
    }
    pub fn to_bytes(&self) -> [u8;HEADER_SIZE] {
        let mut buf = [0u8;HEADER_SIZE];
        buf[0..4].copy_from_slice(&u32::to_le_bytes(self.size));
        buf[4..8].copy_from_slice(&u32::to_le_bytes(self.num_nodes));
        buf[8..40].copy_from_slice(&self.lexicon_name);
        buf[40..60].copy_from_slice(&self.date);
        buf[60..64].copy_from_slice(&u32::to_le_bytes(self.num_words));
        buf
    }
    pub fn from_bytes(buf: &[u8]) -> Result<Self,Error> {
        if buf.len() < HEADER_SIZE {
            return Err(Error::FileTooShort);
        }
        let mut lexicon_name = [0u8;HEADER_LEXICON_NAME_LENGTH];
        lexicon_name.copy_from_slice(&buf[8..40]);
        let mut date = [0u8;HEADER_DATE_LENGTH];
        date.copy_from_slice(&buf[40..60]);
        Ok(Self {
            size: u32::from_le_bytes([buf[0],buf[1],buf[2],buf[3]]),
            num_nodes: u32::from_le_bytes([buf[4],buf[5],buf[6],buf[7]]),
            lexicon_name,
            date,
            num_words: u32::from_le_bytes([buf[60],buf[61],buf[62],buf[63]])
        })
    }
    pub fn lexicon_name_string(&self) -> String {
        trim_padding(&self.lexicon_name)
    }
    pub fn date_string(&self) -> String {
        trim_padding(&self.date)
    }
}

/// Accumulates node records in numbered order and writes the file.
/// The node count promised at creation must be delivered exactly.
pub struct DawgWriter {
    header: DawgHeader,
    nodes: Vec<DawgNode>
}

impl DawgWriter {
    pub fn create(lexicon_name: &str,num_nodes: u32,num_words: u32) -> Self {
        Self {
            header: DawgHeader::create(lexicon_name,num_nodes,num_words),
            nodes: Vec::with_capacity(num_nodes as usize)
        }
    }
    pub fn add_node(&mut self,node: DawgNode) {
        debug_assert!((self.nodes.len() as u32) < self.header.num_nodes);
        self.nodes.push(node);
    }
    pub fn to_bytes(&self) -> Result<Vec<u8>,Error> {
        if self.nodes.len() as u32 != self.header.num_nodes {
            return Err(Error::NodeCountMismatch);
        }
        let mut ans = Vec::with_capacity(HEADER_SIZE + 4 * self.nodes.len());
        ans.extend_from_slice(&self.header.to_bytes());
        for node in &self.nodes {
            ans.extend_from_slice(&u32::to_le_bytes(node.pack()));
        }
        Ok(ans)
    }
    pub fn save(&self,file_name: &str) -> STDRESULT {
        std::fs::write(file_name,self.to_bytes()?)?;
        Ok(())
    }
}

/// A loaded DAWG.  The node buffer is immutable after load and must outlive
/// every query.
#[derive(Debug)]
pub struct Dawg {
    header: DawgHeader,
    nodes: Vec<DawgNode>,
    num_reverse_part_words: u32
}

impl Dawg {
    /// Load a DAWG file and validate it.
    pub fn initialize(file_name: &str) -> Result<Self,DYNERR> {
        let buf = std::fs::read(file_name)?;
        Self::from_bytes(&buf)
    }
    /// Load a DAWG from a byte buffer and validate it.
    pub fn from_bytes(buf: &[u8]) -> Result<Self,DYNERR> {
        let header = DawgHeader::from_bytes(buf)?;
        if header.size != HEADER_SIZE as u32 {
            return Err(Box::new(Error::HeaderMismatch));
        }
        let expected_len = HEADER_SIZE + 4 * header.num_nodes as usize;
        if buf.len() < expected_len {
            return Err(Box::new(Error::FileTooShort));
        }
        if header.num_nodes < MINIMUM_NUMBER_OF_NODES {
            return Err(Box::new(Error::TooFewNodes));
        }
        if header.num_nodes > MAX_NODE_ID {
            return Err(Box::new(Error::CapacityExceeded));
        }
        let mut nodes = Vec::with_capacity(header.num_nodes as usize);
        for i in 0..header.num_nodes as usize {
            let off = HEADER_SIZE + 4 * i;
            let val = u32::from_le_bytes([buf[off],buf[off+1],buf[off+2],buf[off+3]]);
            nodes.push(DawgNode::unpack(val));
        }
        let mut ans = Self {
            header,
            nodes,
            num_reverse_part_words: 0
        };
        let num_words = ans.count_num_words();
        if num_words != ans.header.num_words {
            log::error!("header says {} words, graph has {}",ans.header.num_words,num_words);
            return Err(Box::new(Error::HeaderMismatch));
        }
        ans.num_reverse_part_words = ans.count_num_reverse_part_words();
        log::debug!("loaded DAWG '{}' with {} nodes and {} words",
            ans.header.lexicon_name_string(),ans.header.num_nodes,num_words);
        Ok(ans)
    }
    pub fn get_header(&self) -> &DawgHeader {
        &self.header
    }
    pub fn num_reverse_part_words(&self) -> u32 {
        self.num_reverse_part_words
    }
    pub fn is_word(&self,word: &str) -> bool {
        self.is_word_fragment(word.as_bytes(),self.nodes[FORWARD_WORD_NODE_ID as usize].child_node_id,0)
    }
    pub fn is_reverse_part_word(&self,part_word: &str) -> bool {
        self.is_word_fragment(part_word.as_bytes(),self.nodes[REVERSE_PARTWORD_NODE_ID as usize].child_node_id,0)
    }
    /// Scan the sibling run starting at `node_id` for `fragment[matched_length]`,
    /// descending into the child run when a letter matches.  Empty fragments
    /// never match.  Id 0 or an out of range id ends the descent.
    fn is_word_fragment(&self,fragment: &[u8],node_id: u32,matched_length: usize) -> bool {
        if fragment.is_empty() {
            return false;
        }
        if node_id == 0 || node_id >= self.header.num_nodes {
            return false;
        }
        let letter_to_match = fragment[matched_length];
        let mut id = node_id;
        loop {
            let node = &self.nodes[id as usize];
            if node.letter == letter_to_match {
                if matched_length + 1 == fragment.len() {
                    return node.is_terminal;
                }
                return self.is_word_fragment(fragment,node.child_node_id,matched_length + 1);
            }
            if node.is_last_child {
                return false;
            }
            id += 1;
            if id >= self.header.num_nodes {
                return false;
            }
        }
    }
    fn count_num_words(&self) -> u32 {
        self.count_word_fragments_for_tree(self.nodes[FORWARD_WORD_NODE_ID as usize].child_node_id)
    }
    fn count_num_reverse_part_words(&self) -> u32 {
        self.count_word_fragments_for_tree(self.nodes[REVERSE_PARTWORD_NODE_ID as usize].child_node_id)
    }
    /// Count one for every distinct path ending at a terminal node.  Shared
    /// runs are deliberately counted once per path, which makes the total
    /// equal to the number of distinct strings in the sub-graph.
    fn count_word_fragments_for_tree(&self,node_id: u32) -> u32 {
        // recursion stop condition
        if node_id == 0 || node_id >= self.header.num_nodes {
            return 0;
        }
        let node = &self.nodes[node_id as usize];
        let mut num_word_fragments = 0;
        if node.is_terminal {
            num_word_fragments += 1;
        }
        num_word_fragments += self.count_word_fragments_for_tree(node.child_node_id);
        if !node.is_last_child {
            num_word_fragments += self.count_word_fragments_for_tree(node_id + 1);
        }
        num_word_fragments
    }
}

#[cfg(test)]
const TEST_LEXICON: [&str;7] = ["BAT","BATS","CAR","CARS","CAT","CATS","FAT"];

#[cfg(test)]
fn build_seven_word_dawg() -> Vec<u8> {
    let mut trie = crate::trie::Trie::new();
    for word in TEST_LEXICON {
        trie.add_word(word).expect("add failed");
    }
    while !trie.compress().expect("compress failed") {
        // cooperative steps
    }
    let temp_dir = tempfile::tempdir().expect("tempdir failed");
    let path = temp_dir.path().join("seven.lxd");
    trie.save_as_dawg(path.to_str().unwrap(),"seven word lexicon").expect("save failed");
    std::fs::read(&path).expect("read failed")
}

#[test]
fn writer_packs_nodes() {
    // hand built DAWG holding BAT and BATS forward only
    let nodes = [
        DawgNode { child_node_id: 1, letter: b' ', is_terminal: false, is_last_child: true },
        DawgNode { child_node_id: 2, letter: b'*', is_terminal: false, is_last_child: true },
        DawgNode { child_node_id: 3, letter: b'B', is_terminal: false, is_last_child: true },
        DawgNode { child_node_id: 4, letter: b'A', is_terminal: false, is_last_child: true },
        DawgNode { child_node_id: 5, letter: b'T', is_terminal: true, is_last_child: true },
        DawgNode { child_node_id: 0, letter: b'S', is_terminal: true, is_last_child: true }
    ];
    let mut writer = DawgWriter::create("Unit test lexicon",6,2);
    for node in nodes {
        writer.add_node(node);
    }
    let bytes = writer.to_bytes().expect("serialization failed");
    assert_eq!(bytes.len(),HEADER_SIZE + 4 * 6);
    assert_eq!(&bytes[0..8],&hex::decode("4000000006000000").unwrap()[..]);
    assert_eq!(&bytes[8..25],b"Unit test lexicon");
    assert_eq!(&bytes[25..40],&[0u8;15][..]);
    assert_eq!(&bytes[60..64],&hex::decode("02000000").unwrap()[..]);
    let node_str = "010000880200808a0300809004004090050000d50000c0d4";
    assert_eq!(&bytes[64..],&hex::decode(node_str).unwrap()[..]);
}

#[test]
fn writer_rejects_short_count() {
    let mut writer = DawgWriter::create("short",3,0);
    writer.add_node(DawgNode { child_node_id: 0, letter: b' ', is_terminal: false, is_last_child: true });
    match writer.to_bytes() {
        Err(Error::NodeCountMismatch) => {},
        _ => panic!("expected node count mismatch")
    }
}

#[test]
fn round_trip() {
    let buf = build_seven_word_dawg();
    // file size is exactly header plus packed records
    assert_eq!(buf.len(),HEADER_SIZE + 4 * 32);
    let dawg = Dawg::from_bytes(&buf).expect("load failed");
    assert_eq!(dawg.get_header().num_words,7);
    assert_eq!(dawg.get_header().lexicon_name_string(),"seven word lexicon");
    for word in TEST_LEXICON {
        assert!(dawg.is_word(word),"missing {}",word);
    }
    assert!(!dawg.is_word("BA"));
    assert!(!dawg.is_word("BATH"));
    assert!(!dawg.is_word(""));
    assert!(!dawg.is_reverse_part_word(""));
    assert_eq!(dawg.num_reverse_part_words(),13);
}

#[test]
fn reverse_part_words_cover_every_prefix() {
    let buf = build_seven_word_dawg();
    let dawg = Dawg::from_bytes(&buf).expect("load failed");
    for word in TEST_LEXICON {
        for len in 1..=word.len() {
            let part: String = word[0..len].chars().rev().collect();
            assert!(dawg.is_reverse_part_word(&part),"missing {}",part);
        }
    }
    assert!(!dawg.is_reverse_part_word("ZZ"));
    assert!(!dawg.is_reverse_part_word("BAT"));
}

#[test]
fn truncated_file_is_rejected() {
    let buf = build_seven_word_dawg();
    let err = Dawg::from_bytes(&buf[0..HEADER_SIZE-4]).expect_err("should fail");
    assert_eq!(err.to_string(),"file too short");
    let err = Dawg::from_bytes(&buf[0..buf.len()-4]).expect_err("should fail");
    assert_eq!(err.to_string(),"file too short");
}

#[test]
fn word_count_mismatch_is_rejected() {
    let mut buf = build_seven_word_dawg();
    buf[60] += 1;
    let err = Dawg::from_bytes(&buf).expect_err("should fail");
    assert_eq!(err.to_string(),"header does not match content");
}
