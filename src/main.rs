//! Command line front end: disassemble, lift, or assemble Synacor programs.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lazy_static::lazy_static;
use prettytable::{format as TableFormat, row, Table};

use synacor::analysis::{edges, Disassembler};
use synacor::bytecode::{assemble_program, Instruction};
use synacor::il::{lift, Stmt};
use synacor::Address;

#[derive(Parser, Debug)]
#[command(name = "synacor", version, about = "Disassembler, IL lifter and assembler for the Synacor VM")]
struct Args {
  /// Log decode failures and lifting details
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Disassemble a program image
  Disasm {
    #[arg(value_name = "IMAGE")]
    input: PathBuf,
    /// Byte address to start at (decimal or 0x hex)
    #[arg(long, default_value = "0", value_parser = parse_address)]
    start: Address,
    /// Number of addresses to visit
    #[arg(long)]
    count: Option<usize>,
  },
  /// Print the IL of each instruction in a program image
  Lift {
    #[arg(value_name = "IMAGE")]
    input: PathBuf,
    #[arg(long, default_value = "0", value_parser = parse_address)]
    start: Address,
    #[arg(long)]
    count: Option<usize>,
  },
  /// Assemble a listing into a program image
  Asm {
    #[arg(value_name = "LISTING")]
    input: PathBuf,
    #[arg(short, long, value_name = "IMAGE")]
    output: PathBuf,
  },
}

fn parse_address(text: &str) -> Result<Address, String> {
  let parsed = match text.strip_prefix("0x") {
    Some(digits) => usize::from_str_radix(digits, 16),
    None         => text.parse::<usize>(),
  };
  match parsed {
    Ok(value) if value % 2 == 0 => Ok(Address(value)),
    Ok(value) => Err(format!("{:#X} is not word aligned", value)),
    Err(e)    => Err(e.to_string()),
  }
}

lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

fn raw_words(instruction: &Instruction) -> String {
  std::iter::once(instruction.descriptor.opcode())
    .chain(instruction.operands.iter().map(|operand| operand.value))
    .map(|word| format!("{:04x}", word))
    .collect::<Vec<String>>()
    .join(" ")
}

fn make_listing_table(image: &[u8], start: Address, count: usize) -> Table {
  let mut table = Table::new();
  table.set_format(*TABLE_DISPLAY_FORMAT);
  table.set_titles(row![ubr->"Address", ub->"Words", ub->"Instruction", ub->"Edges"]);

  for (address, result) in Disassembler::starting_at(image, start).take(count) {
    match result {

      Ok(instruction) => {
        let edge_text = edges(&instruction)
                          .iter()
                          .map(|edge| edge.to_string())
                          .collect::<Vec<String>>()
                          .join(", ");
        table.add_row(row![r->address, raw_words(&instruction), instruction, edge_text]);
      }

      Err(e) => {
        table.add_row(row![r->address, "", FR->"??", e]);
      }

    } // end match on decode result
  }
  table
}

fn print_il(image: &[u8], start: Address, count: usize) {
  for (address, result) in Disassembler::starting_at(image, start).take(count) {
    match result {
      Ok(instruction) => {
        let mut il: Vec<Stmt> = Vec::new();
        lift(&instruction, &mut il);
        println!("{}  {}", address, instruction);
        for stmt in il {
          println!("          {}", stmt);
        }
      }
      Err(e) => println!("{}  ?? {}", address, e),
    }
  }
}

fn read_image(path: &PathBuf) -> Result<Vec<u8>> {
  fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn main() -> Result<()> {
  let args = Args::parse();

  let filter = match args.verbose {
    true  => "debug",
    false => "warn"
  };
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

  match args.command {

    Command::Disasm{ input, start, count } => {
      let image = read_image(&input)?;
      make_listing_table(&image, start, count.unwrap_or(usize::MAX)).printstd();
    }

    Command::Lift{ input, start, count } => {
      let image = read_image(&input)?;
      print_il(&image, start, count.unwrap_or(usize::MAX));
    }

    Command::Asm{ input, output } => {
      let text = fs::read_to_string(&input)
                   .with_context(|| format!("failed to read {}", input.display()))?;
      let image = assemble_program(&text)
                   .with_context(|| format!("failed to assemble {}", input.display()))?;
      fs::write(&output, &image)
        .with_context(|| format!("failed to write {}", output.display()))?;
      log::info!("wrote {} bytes to {}", image.len(), output.display());
    }

  }
  Ok(())
}
