// src/prompt.rs
//! Interactive operator prompts: manual pairing and plan selection
//!
//! [`TerminalPrompt`] works on any `BufRead`/`Write` pair so it can be
//! driven from tests with in-memory buffers.

use std::collections::HashSet;
use std::io::{BufRead, Write};

use crate::config::DirectoryEntry;
use crate::error::{Result, SyncError};
use crate::matching::PairingPrompt;
use crate::plan::TransferPlan;
use crate::sync::SyncOptions;

/// Confirms which plans run. An empty selection declines the run.
pub trait PlanApproval {
    fn approve_plans(
        &mut self,
        plans: &[TransferPlan],
        options: &SyncOptions,
    ) -> Result<Vec<usize>>;
}

/// Parsed answer to the plan selection question
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Quit,
    /// Zero-based positions in display order, no duplicates
    Plans(Vec<usize>),
}

/// Parse `all`, `q`, `X`, `X:Y` (inclusive, X < Y) or `X,Y,Z` against
/// `count` plans numbered from 1. `None` for anything else.
pub fn parse_selection(input: &str, count: usize) -> Option<Selection> {
    let input = input.trim().to_ascii_lowercase();
    let in_range = |n: usize| (1..=count).contains(&n);

    match input.as_str() {
        "" => None,
        "all" => Some(Selection::All),
        "q" | "quit" => Some(Selection::Quit),
        s if s.contains(':') => {
            let (start, end) = s.split_once(':')?;
            let start: usize = start.trim().parse().ok()?;
            let end: usize = end.trim().parse().ok()?;
            (in_range(start) && in_range(end) && start < end)
                .then(|| Selection::Plans((start - 1..end).collect()))
        }
        s => {
            let mut seen = HashSet::new();
            let mut picked = Vec::new();
            for part in s.split(',') {
                let n: usize = part.trim().parse().ok()?;
                if !in_range(n) {
                    return None;
                }
                if seen.insert(n) {
                    picked.push(n - 1);
                }
            }
            Some(Selection::Plans(picked))
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    /// Prompt and read one line. `None` at end of input.
    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// `y`/`yes` or `n`/`no`, repeated until one of them. End of input is no.
    pub fn ask_yes_no(&mut self, question: &str) -> Result<bool> {
        loop {
            match self.ask(question)?.map(|a| a.to_ascii_lowercase()).as_deref() {
                None => return Ok(false),
                Some("y" | "yes") => return Ok(true),
                Some("n" | "no") => return Ok(false),
                Some(_) => writeln!(self.output, "Please answer y or n.")?,
            }
        }
    }
}

impl<R: BufRead, W: Write> PlanApproval for TerminalPrompt<R, W> {
    fn approve_plans(
        &mut self,
        plans: &[TransferPlan],
        options: &SyncOptions,
    ) -> Result<Vec<usize>> {
        if plans.is_empty() {
            writeln!(self.output, "No synchronization plans scheduled.")?;
            return Ok(Vec::new());
        }

        let selected: Vec<usize> = if plans.len() > 1 {
            writeln!(self.output, "\nThe following synchronization plans are scheduled:\n")?;
            for plan in plans {
                writeln!(self.output, "  {}. {}", plan.index, plan.describe())?;
            }
            loop {
                let Some(answer) = self.ask(
                    "\nSelect plans to execute ([all], [X], [X:Y], [X,Y,Z], or [q] to quit): ",
                )?
                else {
                    return Ok(Vec::new());
                };
                match parse_selection(&answer, plans.len()) {
                    Some(Selection::All) => break (0..plans.len()).collect(),
                    Some(Selection::Quit) => {
                        writeln!(self.output, "Selection canceled. No plans selected.")?;
                        return Ok(Vec::new());
                    }
                    Some(Selection::Plans(picked)) => break picked,
                    None => writeln!(
                        self.output,
                        "Invalid selection, numbers must be in 1-{}.",
                        plans.len()
                    )?,
                }
            }
        } else {
            vec![0]
        };

        writeln!(self.output, "Please confirm the following synchronization plans:\n")?;
        for &i in &selected {
            writeln!(self.output, "  {}. {}", plans[i].index, plans[i].describe())?;
        }
        writeln!(self.output, "\nSettings:")?;
        writeln!(self.output, "  - Dry Run:                      {}", yes_no(options.dry_run))?;
        writeln!(
            self.output,
            "  - Remove files at destination:  {}",
            yes_no(options.remove_extraneous)
        )?;

        if self.ask_yes_no("\nDo you want to continue? (y/n): ")? {
            Ok(selected)
        } else {
            Ok(Vec::new())
        }
    }
}

impl<R: BufRead, W: Write> PairingPrompt for TerminalPrompt<R, W> {
    fn request_pairing(
        &mut self,
        sources: &[DirectoryEntry],
        destinations: &[DirectoryEntry],
    ) -> Result<Vec<(usize, usize)>> {
        let mut used = HashSet::new();
        let mut pairs = Vec::new();

        for (src_idx, source) in sources.iter().enumerate() {
            let candidates: Vec<usize> = destinations
                .iter()
                .enumerate()
                .filter(|(i, d)| !used.contains(i) && d.sensitive == source.sensitive)
                .map(|(i, _)| i)
                .collect();

            if candidates.is_empty() {
                writeln!(
                    self.output,
                    "No destination left for \"{}\", skipping.",
                    source.path.display()
                )?;
                continue;
            }

            writeln!(
                self.output,
                "\nSelect a destination for \"{}\":",
                source.path.display()
            )?;
            for (n, &dst_idx) in candidates.iter().enumerate() {
                writeln!(
                    self.output,
                    "  {}. {}",
                    n + 1,
                    destinations[dst_idx].path.display()
                )?;
            }

            loop {
                let Some(answer) = self.ask("Number (0 to skip): ")? else {
                    return Err(SyncError::AmbiguousMatch(
                        "input ended before every source was paired".into(),
                    ));
                };
                match answer.parse::<usize>() {
                    Ok(0) => break,
                    Ok(n) if n <= candidates.len() => {
                        let dst_idx = candidates[n - 1];
                        used.insert(dst_idx);
                        pairs.push((src_idx, dst_idx));
                        break;
                    }
                    _ => writeln!(
                        self.output,
                        "Invalid number: must be between 0 and {}.",
                        candidates.len()
                    )?,
                }
            }
        }
        Ok(pairs)
    }
}
