use clap::{arg,crate_version,Command};
use lexdawg::trie::Trie;
use lexdawg::dawg::Dawg;
use lexdawg::lexicon;

const RCH: &str = "unreachable was reached";

fn main() -> Result<(),Box<dyn std::error::Error>>
{
    env_logger::init();

    let long_help =
"Examples:
---------
Build:      `lexdawg make -i words.txt -o words.lxd -n TWL06`
Inspect:    `lexdawg info -i words.lxd`
Query:      `lexdawg query -i words.lxd -w BATH`
Reverse:    `lexdawg query -i words.lxd -w TAB -r`";

    let mut main_cmd = Command::new("lexdawg")
        .about("Build and query two-way DAWG lexicons")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(Command::new("make")
        .arg(arg!(-i --input <PATH> "text lexicon path").required(true))
        .arg(arg!(-o --output <PATH> "DAWG output path").required(true))
        .arg(arg!(-n --name <NAME> "lexicon name for the header").required(true))
        .about("build a DAWG file from a text lexicon"));
    main_cmd = main_cmd.subcommand(Command::new("info")
        .arg(arg!(-i --input <PATH> "DAWG file path").required(true))
        .about("show header and counts of a DAWG file"));
    main_cmd = main_cmd.subcommand(Command::new("query")
        .arg(arg!(-i --input <PATH> "DAWG file path").required(true))
        .arg(arg!(-w --word <WORD> "word to look up").required(true))
        .arg(arg!(-r --reverse "look up a reverse part word"))
        .about("look up a word in a DAWG file"));

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("make") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let name = cmd.get_one::<String>("name").expect(RCH);
        let mut trie = Trie::new();
        let num_added = lexicon::add_words_from_file(&mut trie,path_in)?;
        log::info!("added {} words from {}",num_added,path_in);
        while trie.compress()? == false {
            // a GUI would repaint here
        }
        trie.save_as_dawg(path_out,name)?;
        let diagnostics = trie.get_diagnostics();
        println!("SUMMARY");
        println!();
        println!("BEFORE COMPRESSION");
        println!("Number of Nodes: {}",diagnostics.num_nodes);
        println!("Number of First Children: {}",diagnostics.num_first_children_before_compression);
        println!();
        println!("AFTER COMPRESSION");
        println!("Number of Nodes: {}",diagnostics.num_nodes_after_compression);
        println!("Number of First Children: {}",diagnostics.num_first_children_after_compression);
        println!();
        println!("NUMBER OF WORDS: {}",diagnostics.num_words);
    }

    if let Some(cmd) = matches.subcommand_matches("info") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let dawg = Dawg::initialize(path_in)?;
        let header = dawg.get_header();
        println!("Lexicon Name: {}",header.lexicon_name_string());
        println!("Date: {}",header.date_string());
        println!("Number of Nodes: {}",header.num_nodes);
        println!("Number of Words: {}",header.num_words);
        println!("Number of Reverse Part Words: {}",dawg.num_reverse_part_words());
    }

    if let Some(cmd) = matches.subcommand_matches("query") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let word = cmd.get_one::<String>("word").expect(RCH).to_ascii_uppercase();
        let dawg = Dawg::initialize(path_in)?;
        let found = match cmd.get_flag("reverse") {
            true => dawg.is_reverse_part_word(&word),
            false => dawg.is_word(&word)
        };
        println!("{}: {}",word,match found { true => "found", false => "not found" });
    }

    Ok(())
}
