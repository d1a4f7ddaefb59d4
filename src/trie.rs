//! Two-way word trie with DAWG compression
//!
//! The trie holds a lexicon twice: every word is inserted beneath a forward
//! marker node, and every reversed part word (the reversal of each prefix)
//! beneath a reverse marker node.  Child alternatives hang off a parent as a
//! sibling run kept strictly ascending by letter.
//!
//! The structure moves through three states.  It starts out `AddingWords`.
//! The first call to `compress` freezes it and begins merging equivalent
//! sub-graphs; each call does one bounded step and returns `false` until the
//! work is done, so a UI thread can interleave its own work.  Once `true` is
//! returned the state is `Compressed`, nodes carry their final sequential
//! numbers, and the only remaining operation is `save_as_dawg`.

use bit_vec::BitVec;
use crate::tools::block_arena::BlockArena;
use crate::dawg;
use crate::dawg::{DawgNode,DawgWriter};
use crate::{Error,STDRESULT};

/// block size handed to the arena, far larger than a node
const TRIE_BLOCK_SIZE: usize = 65536;

const UNASSIGNED_NODE_NUMBER: u32 = u32::MAX;

/// Node in the build-time graph.  Links are arena indices.  The original
/// parent is recorded at creation and used exactly once, to redirect that
/// parent when this node turns out to head a duplicate run; it is never
/// traversed.
struct TrieNode {
    first_child: Option<u32>,
    next_sibling: Option<u32>,
    original_parent: Option<u32>,
    letter: u8,
    is_terminal: bool,
    /// set when this first child heads a run that duplicates an earlier one
    is_duplicate: bool,
    node_number: u32
}

/// Running counters, all cheap to keep.  The three compression figures are
/// zero until compression finishes.
#[derive(Clone,Copy,Default,Debug)]
pub struct TrieDiagnostics {
    pub num_nodes: u32,
    pub num_words: u32,
    /// forward word letters only
    pub num_word_letters: u32,
    /// every child insertion, shared or not
    pub num_letters: u32,
    pub num_reverse_part_words: u32,
    pub num_first_children_before_compression: u32,
    pub num_first_children_after_compression: u32,
    pub num_nodes_after_compression: u32
}

#[derive(Clone,Copy,PartialEq,Debug)]
enum TrieState {
    AddingWords,
    Compressing,
    Compressed
}

fn is_valid_letter(letter: u8) -> bool {
    (dawg::START_LETTER..=dawg::END_LETTER).contains(&letter)
        || letter == dawg::FORWARD_WORD_DAWG_SYMBOL
        || letter == dawg::REVERSE_PARTWORD_DAWG_SYMBOL
}

pub struct Trie {
    state: TrieState,
    nodes: BlockArena<TrieNode>,
    root: u32,
    forward_word_node: u32,
    reverse_part_word_node: u32,
    diagnostics: TrieDiagnostics,
    /// every node reached as a first child, in pre-order
    first_children: Vec<u32>,
    /// where the next compression step picks up
    compress_idx: usize
}

impl Trie {
    pub fn new() -> Self {
        let nodes = BlockArena::create(TRIE_BLOCK_SIZE).expect("node must fit in a block");
        let mut trie = Self {
            state: TrieState::AddingWords,
            nodes,
            root: 0,
            forward_word_node: 0,
            reverse_part_word_node: 0,
            diagnostics: TrieDiagnostics::default(),
            first_children: Vec::new(),
            compress_idx: 0
        };
        trie.root = trie.allocate_new_node(None,dawg::DEFAULT_LETTER,false);
        trie.forward_word_node = trie.allocate_new_node(Some(trie.root),dawg::FORWARD_WORD_DAWG_SYMBOL,false);
        trie.reverse_part_word_node = trie.allocate_new_node(Some(trie.root),dawg::REVERSE_PARTWORD_DAWG_SYMBOL,false);
        trie.nodes[trie.root].first_child = Some(trie.forward_word_node);
        trie.nodes[trie.forward_word_node].next_sibling = Some(trie.reverse_part_word_node);
        trie
    }
    /// Add one uppercase word.  Words can come in any order and duplicates
    /// create no new nodes.  Letters outside A-Z are a caller error.
    pub fn add_word(&mut self,word: &str) -> Result<(),Error> {
        if self.state != TrieState::AddingWords {
            return Err(Error::AddingFrozen);
        }
        let letters = word.as_bytes();
        let mut cur_node = self.forward_word_node;
        for (idx,letter) in letters.iter().enumerate() {
            let is_word_terminal = idx + 1 == letters.len();
            cur_node = self.add_child_node(cur_node,*letter,is_word_terminal);
        }
        if !letters.is_empty() {
            self.diagnostics.num_words += 1;
            self.diagnostics.num_word_letters += letters.len() as u32;
        }
        self.add_reversed_part_words(letters);
        Ok(())
    }
    /// Run one compression step.  Returns `false` while more steps remain;
    /// keep calling until `true`.  Calling again after that is an error.
    pub fn compress(&mut self) -> Result<bool,Error> {
        if self.state == TrieState::Compressed {
            return Err(Error::AlreadyCompressed);
        }
        if self.state == TrieState::AddingWords {
            self.state = TrieState::Compressing;
            self.identify_first_children(Some(self.root));
            self.compress_idx = 0;
            self.diagnostics.num_first_children_before_compression = self.first_children.len() as u32;
            log::debug!("collected {} first children",self.first_children.len());
        }
        if self.compress_idx + 1 >= self.first_children.len() {
            self.state = TrieState::Compressed;
            // number the survivors
            for node in self.nodes.iter_mut() {
                node.node_number = UNASSIGNED_NODE_NUMBER;
            }
            let num_nodes = self.assign_node_number_for_tree(Some(self.root),0);
            self.update_after_compression_diagnostics();
            debug_assert_eq!(num_nodes,self.diagnostics.num_nodes_after_compression);
            if num_nodes > dawg::MAX_NODE_ID {
                return Err(Error::CapacityExceeded);
            }
            log::debug!("compressed {} nodes down to {}",self.diagnostics.num_nodes,num_nodes);
            Ok(true)
        } else {
            self.remove_duplicates(self.compress_idx);
            self.compress_idx += 1;
            Ok(false)
        }
    }
    /// Write the compressed graph as a DAWG file.
    pub fn save_as_dawg(&self,file_name: &str,lexicon_name: &str) -> STDRESULT {
        if self.state != TrieState::Compressed {
            return Err(Box::new(Error::NotCompressed));
        }
        let mut writer = DawgWriter::create(
            lexicon_name,
            self.diagnostics.num_nodes_after_compression,
            self.diagnostics.num_words);
        self.add_tree_to_dawg(Some(self.root),&mut writer,-1);
        log::debug!("writing {} nodes to {}",self.diagnostics.num_nodes_after_compression,file_name);
        writer.save(file_name)
    }
    pub fn get_diagnostics(&self) -> TrieDiagnostics {
        self.diagnostics
    }

    fn allocate_new_node(&mut self,original_parent: Option<u32>,letter: u8,is_terminal: bool) -> u32 {
        self.diagnostics.num_nodes += 1;
        self.nodes.alloc(TrieNode {
            first_child: None,
            next_sibling: None,
            original_parent,
            letter,
            is_terminal,
            is_duplicate: false,
            node_number: UNASSIGNED_NODE_NUMBER
        })
    }
    /// Find or create the child of `parent_node` carrying `child_letter`,
    /// keeping the sibling run ascending.  A re-used node may gain terminal
    /// status but never lose it.
    fn add_child_node(&mut self,parent_node: u32,child_letter: u8,is_word_terminal: bool) -> u32 {
        debug_assert!(is_valid_letter(child_letter));
        self.diagnostics.num_letters += 1;

        // does the parent have a child?
        let first = match self.nodes[parent_node].first_child {
            Some(id) => id,
            None => {
                let new_node = self.allocate_new_node(Some(parent_node),child_letter,is_word_terminal);
                self.nodes[parent_node].first_child = Some(new_node);
                return new_node;
            }
        };

        // child run exists, find the letter or the splice point
        let mut cur_node = Some(first);
        let mut prev_sibling: Option<u32> = None;
        while let Some(cur) = cur_node {
            if self.nodes[cur].letter == child_letter {
                // true always trumps what is already there
                if is_word_terminal {
                    self.nodes[cur].is_terminal = true;
                }
                return cur;
            }
            if child_letter < self.nodes[cur].letter {
                let new_node = self.allocate_new_node(Some(parent_node),child_letter,is_word_terminal);
                self.nodes[new_node].next_sibling = Some(cur);
                match prev_sibling {
                    None => self.nodes[parent_node].first_child = Some(new_node),
                    Some(prev) => self.nodes[prev].next_sibling = Some(new_node)
                }
                return new_node;
            }
            prev_sibling = cur_node;
            cur_node = self.nodes[cur].next_sibling;
        }

        // the new node becomes the last child
        let new_node = self.allocate_new_node(Some(parent_node),child_letter,is_word_terminal);
        let prev = prev_sibling.expect("run cannot be empty here");
        self.nodes[prev].next_sibling = Some(new_node);
        new_node
    }
    /// Insert every reversed part word.  For CATS these are STAC, TAC, AC
    /// and C.
    fn add_reversed_part_words(&mut self,letters: &[u8]) {
        for length in (1..=letters.len()).rev() {
            let mut cur_node = self.reverse_part_word_node;
            for idx in (0..length).rev() {
                cur_node = self.add_child_node(cur_node,letters[idx],idx == 0);
            }
            self.diagnostics.num_reverse_part_words += 1;
        }
    }
    /// Two runs are similar when letters, terminal flags, remaining siblings
    /// and child runs all agree.  This compares whole sub-graphs.
    fn are_nodes_similar(&self,node1: Option<u32>,node2: Option<u32>) -> bool {
        // same node, or both absent?
        if node1 == node2 {
            return true;
        }
        let (id1,id2) = match (node1,node2) {
            (Some(id1),Some(id2)) => (id1,id2),
            _ => return false
        };
        if self.nodes[id1].letter != self.nodes[id2].letter {
            return false;
        }
        if self.nodes[id1].is_terminal != self.nodes[id2].is_terminal {
            return false;
        }
        if !self.are_nodes_similar(self.nodes[id1].next_sibling,self.nodes[id2].next_sibling) {
            return false;
        }
        self.are_nodes_similar(self.nodes[id1].first_child,self.nodes[id2].first_child)
    }
    /// Collect every node reached as a first child, in pre-order.  Only
    /// these head a child run, so only these are merge candidates.
    fn identify_first_children(&mut self,parent_node: Option<u32>) {
        let parent = match parent_node {
            Some(id) => id,
            None => return
        };
        if let Some(first_child) = self.nodes[parent].first_child {
            self.first_children.push(first_child);
            self.identify_first_children(Some(first_child));
        }
        if let Some(next_sibling) = self.nodes[parent].next_sibling {
            self.identify_first_children(Some(next_sibling));
        }
    }
    /// One compression step: mark every later first child that duplicates
    /// this one and point its original parent at the survivor.
    fn remove_duplicates(&mut self,node1_idx: usize) {
        let node1 = self.first_children[node1_idx];
        for node2_idx in node1_idx + 1..self.first_children.len() {
            let node2 = self.first_children[node2_idx];
            if !self.nodes[node2].is_duplicate && self.are_nodes_similar(Some(node1),Some(node2)) {
                self.nodes[node2].is_duplicate = true;
                let parent = self.nodes[node2].original_parent.expect("first child has a parent");
                self.nodes[parent].first_child = Some(node1);
            }
        }
    }
    /// Number the surviving nodes sequentially, keeping each sibling run
    /// contiguous.  Duplicate heads and already numbered nodes are skipped.
    /// Returns the next free number, which equals the surviving node count
    /// when started at the root with 0.
    fn assign_node_number_for_tree(&mut self,node: Option<u32>,mut next_node_number: u32) -> u32 {
        let id = match node {
            Some(id) => id,
            None => return next_node_number
        };
        if self.nodes[id].is_duplicate {
            return next_node_number;
        }
        if self.nodes[id].node_number != UNASSIGNED_NODE_NUMBER {
            return next_node_number;
        }
        self.nodes[id].node_number = next_node_number;
        next_node_number += 1;
        let mut sibling = self.nodes[id].next_sibling;
        while let Some(sib) = sibling {
            self.nodes[sib].node_number = next_node_number;
            next_node_number += 1;
            sibling = self.nodes[sib].next_sibling;
        }
        next_node_number = self.assign_node_number_for_tree(self.nodes[id].first_child,next_node_number);
        let mut sibling = self.nodes[id].next_sibling;
        while let Some(sib) = sibling {
            next_node_number = self.assign_node_number_for_tree(self.nodes[sib].first_child,next_node_number);
            sibling = self.nodes[sib].next_sibling;
        }
        next_node_number
    }
    /// Emit the whole sibling run, then the children of every member.  The
    /// sequential numbers guard against re-emitting shared runs.
    fn add_tree_to_dawg(&self,node: Option<u32>,writer: &mut DawgWriter,mut last_saved: i64) -> i64 {
        let id = match node {
            Some(id) => id,
            None => return last_saved
        };
        if self.nodes[id].node_number == UNASSIGNED_NODE_NUMBER {
            return last_saved;
        }
        if (self.nodes[id].node_number as i64) <= last_saved {
            return last_saved;
        }
        let mut save_node = Some(id);
        while let Some(save_id) = save_node {
            debug_assert_eq!(self.nodes[save_id].node_number as i64,last_saved + 1);
            writer.add_node(self.trie_node_to_dawg_node(save_id));
            last_saved = self.nodes[save_id].node_number as i64;
            save_node = self.nodes[save_id].next_sibling;
        }
        let mut save_node = Some(id);
        while let Some(save_id) = save_node {
            last_saved = self.add_tree_to_dawg(self.nodes[save_id].first_child,writer,last_saved);
            save_node = self.nodes[save_id].next_sibling;
        }
        last_saved
    }
    fn trie_node_to_dawg_node(&self,id: u32) -> DawgNode {
        let node = &self.nodes[id];
        DawgNode {
            child_node_id: match node.first_child {
                Some(child) => self.nodes[child].node_number,
                None => 0
            },
            letter: node.letter,
            is_terminal: node.is_terminal,
            is_last_child: node.next_sibling.is_none()
        }
    }
    fn update_after_compression_diagnostics(&mut self) {
        let num_duplicates = self.first_children.iter()
            .filter(|id| self.nodes[**id].is_duplicate)
            .count();
        self.diagnostics.num_first_children_after_compression =
            (self.first_children.len() - num_duplicates) as u32;
        self.diagnostics.num_nodes_after_compression = self.node_count();
    }
    /// surviving node count, one per unique node even where runs are shared
    fn node_count(&self) -> u32 {
        let mut visited = BitVec::from_elem(self.nodes.len(),false);
        self.node_count_for_tree(Some(self.root),&mut visited)
    }
    fn node_count_for_tree(&self,node: Option<u32>,visited: &mut BitVec) -> u32 {
        let id = match node {
            Some(id) => id,
            None => return 0
        };
        let mut count = 0;
        if !visited.get(id as usize).unwrap_or(true) {
            visited.set(id as usize,true);
            count = 1;
        }
        count += self.node_count_for_tree(self.nodes[id].next_sibling,visited);
        count += self.node_count_for_tree(self.nodes[id].first_child,visited);
        count
    }
}

#[cfg(test)]
const TEST_LEXICON: [&str;7] = ["BAT","BATS","CAR","CARS","CAT","CATS","FAT"];

#[cfg(test)]
fn expected_diagnostics(words: &[&str]) -> TrieDiagnostics {
    let mut expected = TrieDiagnostics::default();
    expected.num_words = words.len() as u32;
    for word in words {
        let len = word.len() as u32;
        // forward letters plus the reversed part word triangle
        expected.num_letters += len + len * (len + 1) / 2;
        expected.num_reverse_part_words += len;
        expected.num_word_letters += len;
    }
    expected
}

#[cfg(test)]
fn build_test_trie() -> Trie {
    let mut trie = Trie::new();
    for word in TEST_LEXICON {
        trie.add_word(word).expect("add failed");
    }
    trie
}

#[cfg(test)]
fn check_runs_ascend(trie: &Trie,node: Option<u32>) {
    let id = match node {
        Some(id) => id,
        None => return
    };
    if let Some(sib) = trie.nodes[id].next_sibling {
        assert!(trie.nodes[id].letter < trie.nodes[sib].letter,"sibling run out of order");
    }
    check_runs_ascend(trie,trie.nodes[id].first_child);
    check_runs_ascend(trie,trie.nodes[id].next_sibling);
}

#[test]
fn add_one_word() {
    let word = "BATH";
    let len = word.len() as u32;
    // root and the two markers, the forward path, the reversed triangle
    let expected_nodes = 3 + len + len * (len + 1) / 2;

    let mut trie = Trie::new();
    trie.add_word(word).expect("add failed");
    let diagnostics = trie.get_diagnostics();
    assert_eq!(diagnostics.num_words,1);
    assert_eq!(diagnostics.num_word_letters,len);
    assert_eq!(diagnostics.num_reverse_part_words,len);
    assert_eq!(diagnostics.num_nodes,expected_nodes);
}

#[test]
fn add_words() {
    let trie = build_test_trie();
    let mut expected = expected_diagnostics(&TEST_LEXICON);
    expected.num_nodes = 39;
    let diagnostics = trie.get_diagnostics();
    assert_eq!(diagnostics.num_words,expected.num_words);
    assert_eq!(diagnostics.num_word_letters,expected.num_word_letters);
    assert_eq!(diagnostics.num_nodes,expected.num_nodes);
    assert_eq!(diagnostics.num_reverse_part_words,expected.num_reverse_part_words);
    assert_eq!(diagnostics.num_letters,expected.num_letters);
}

#[test]
fn compress_lexicon() {
    let mut trie = build_test_trie();
    while !trie.compress().expect("compress failed") {
        // cooperative steps
    }
    let diagnostics = trie.get_diagnostics();
    assert_eq!(diagnostics.num_first_children_before_compression,22);
    assert_eq!(diagnostics.num_first_children_after_compression,17);
    assert_eq!(diagnostics.num_nodes_after_compression,32);
}

#[test]
fn duplicate_words_add_no_nodes() {
    let mut once = Trie::new();
    once.add_word("CAT").expect("add failed");
    let mut twice = Trie::new();
    twice.add_word("CAT").expect("add failed");
    twice.add_word("CAT").expect("add failed");
    assert_eq!(once.get_diagnostics().num_nodes,twice.get_diagnostics().num_nodes);
}

#[test]
fn empty_word_is_a_no_op() {
    let mut trie = Trie::new();
    trie.add_word("").expect("add failed");
    let diagnostics = trie.get_diagnostics();
    assert_eq!(diagnostics.num_words,0);
    assert_eq!(diagnostics.num_nodes,3);
    assert_eq!(diagnostics.num_reverse_part_words,0);
}

#[test]
fn sibling_runs_stay_sorted() {
    // insertion order forces splices at the head, middle and tail
    let mut trie = Trie::new();
    for word in ["TIP","AXE","MOP","ZED","BIB"] {
        trie.add_word(word).expect("add failed");
    }
    check_runs_ascend(&trie,Some(trie.root));
}

#[test]
fn survivors_are_dissimilar() {
    let mut trie = build_test_trie();
    while !trie.compress().expect("compress failed") {
        // cooperative steps
    }
    let survivors: Vec<u32> = trie.first_children.iter()
        .filter(|id| !trie.nodes[**id].is_duplicate)
        .copied()
        .collect();
    for i in 0..survivors.len() {
        for j in i + 1..survivors.len() {
            assert!(!trie.are_nodes_similar(Some(survivors[i]),Some(survivors[j])),
                "two surviving first children are similar");
        }
    }
}

#[test]
fn state_machine_is_enforced() {
    let mut trie = build_test_trie();
    assert_eq!(trie.compress().expect("compress failed"),false);
    match trie.add_word("LATE") {
        Err(Error::AddingFrozen) => {},
        _ => panic!("expected frozen error")
    }
    while !trie.compress().expect("compress failed") {
        // cooperative steps
    }
    match trie.compress() {
        Err(Error::AlreadyCompressed) => {},
        _ => panic!("expected already compressed error")
    }
}

#[test]
fn save_requires_compression() {
    let trie = build_test_trie();
    assert!(trie.save_as_dawg("/tmp/never-written.lxd","x").is_err());
}
