//! Console Module
//!
//! Interactive front-end over a single [`Store`].
//!
//! The console keeps no state of its own: it borrows one store, validates
//! what the user types (see [`validate`]) and renders results. Any
//! `BufRead`/`Write` pair works, which is how the menu is tested.

pub mod validate;

use std::fmt;
use std::io::{self, BufRead, Write};

use crate::error::Result;
use crate::record::Record;
use crate::store::Store;

const MENU: &str = "\
--- INVENTORY MANAGEMENT ---
1. Add product
2. Remove product
3. Update product
4. Find by ID
5. Search by name
6. List all products
7. Exit";

/// Menu driver borrowing one store
pub struct Console<'a> {
    store: &'a mut Store,
}

impl<'a> Console<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }

    /// Run the menu until the user exits or input ends
    ///
    /// Store errors (a failed save) are shown and the loop carries on.
    /// Only I/O errors on `input`/`output` end the loop with an error.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: W) -> Result<()> {
        let mut term = Terminal { input, output };

        loop {
            term.say("")?;
            term.say(MENU)?;
            let Some(choice) = term.ask("Select an option (1-7): ")? else {
                break;
            };

            let done = match choice.trim() {
                "1" => self.add(&mut term)?,
                "2" => self.remove(&mut term)?,
                "3" => self.update(&mut term)?,
                "4" => self.find_by_id(&mut term)?,
                "5" => self.search(&mut term)?,
                "6" => {
                    self.list(&mut term)?;
                    Flow::Continue
                }
                "7" => {
                    term.say("Exiting.")?;
                    break;
                }
                other => {
                    term.say(format!("Invalid option '{}', choose 1-7.", other))?;
                    Flow::Continue
                }
            };
            if done == Flow::InputClosed {
                break;
            }
        }

        Ok(())
    }

    fn add<R: BufRead, W: Write>(&mut self, term: &mut Terminal<R, W>) -> Result<Flow> {
        term.say("--- NEW PRODUCT ---")?;
        let Some(id) = term.ask_until("Product ID: ", validate::parse_id)? else {
            return Ok(Flow::InputClosed);
        };
        let Some(name) = term.ask_until("Name: ", validate::parse_name)? else {
            return Ok(Flow::InputClosed);
        };
        let Some(quantity) = term.ask_until("Quantity in stock: ", validate::parse_quantity)?
        else {
            return Ok(Flow::InputClosed);
        };
        let Some(price) = term.ask_until("Unit price: ", validate::parse_price)? else {
            return Ok(Flow::InputClosed);
        };

        match self.store.add(Record::new(id, name, quantity, price)) {
            Ok(true) => term.say("Product added.")?,
            Ok(false) => term.say("Error: a product with that ID already exists.")?,
            Err(e) => term.say(format!("Error: {}", e))?,
        }
        Ok(Flow::Continue)
    }

    fn remove<R: BufRead, W: Write>(&mut self, term: &mut Terminal<R, W>) -> Result<Flow> {
        let Some(id) = term.ask("ID of the product to remove: ")? else {
            return Ok(Flow::InputClosed);
        };

        match self.store.remove(id.trim()) {
            Ok(true) => term.say("Product removed.")?,
            Ok(false) => term.say("Error: product not found.")?,
            Err(e) => term.say(format!("Error: {}", e))?,
        }
        Ok(Flow::Continue)
    }

    fn update<R: BufRead, W: Write>(&mut self, term: &mut Terminal<R, W>) -> Result<Flow> {
        let Some(id) = term.ask("ID of the product to update: ")? else {
            return Ok(Flow::InputClosed);
        };
        let id = id.trim();

        let Some(current) = self.store.find_by_id(id) else {
            term.say("Error: product not found.")?;
            return Ok(Flow::Continue);
        };
        term.say(format!("Current: {}", current))?;

        let Some(quantity) = term.ask("New quantity (blank to keep): ")? else {
            return Ok(Flow::InputClosed);
        };
        let Some(price) = term.ask("New price (blank to keep): ")? else {
            return Ok(Flow::InputClosed);
        };

        let parsed = validate::parse_optional_quantity(&quantity)
            .and_then(|q| Ok((q, validate::parse_optional_price(&price)?)));
        let (quantity, price) = match parsed {
            Ok(values) => values,
            Err(e) => {
                term.say(format!("Error: {}", e))?;
                return Ok(Flow::Continue);
            }
        };

        match self.store.update(id, quantity, price) {
            Ok(true) => term.say("Product updated.")?,
            Ok(false) => term.say("Error: product not found.")?,
            Err(e) => term.say(format!("Error: {}", e))?,
        }
        Ok(Flow::Continue)
    }

    fn find_by_id<R: BufRead, W: Write>(&mut self, term: &mut Terminal<R, W>) -> Result<Flow> {
        let Some(id) = term.ask("ID to look up: ")? else {
            return Ok(Flow::InputClosed);
        };

        match self.store.find_by_id(id.trim()) {
            Some(record) => term.say(record)?,
            None => term.say("Product not found.")?,
        }
        Ok(Flow::Continue)
    }

    fn search<R: BufRead, W: Write>(&mut self, term: &mut Terminal<R, W>) -> Result<Flow> {
        let Some(term_text) = term.ask("Name or part of a name: ")? else {
            return Ok(Flow::InputClosed);
        };

        let found = self.store.find_by_name(term_text.trim());
        if found.is_empty() {
            term.say("No products match that name.")?;
        } else {
            term.say(format!("Found {} product(s):", found.len()))?;
            for record in found {
                term.say(record)?;
            }
        }
        Ok(Flow::Continue)
    }

    fn list<R: BufRead, W: Write>(&mut self, term: &mut Terminal<R, W>) -> Result<()> {
        let all = self.store.list_all();
        if all.is_empty() {
            term.say("The inventory is empty.")?;
            return Ok(());
        }

        term.say("--- PRODUCTS ---")?;
        for record in &all {
            term.say(record)?;
        }
        term.say(format!("Total: {} product(s)", all.len()))?;
        Ok(())
    }
}

/// Whether the menu can keep reading
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    InputClosed,
}

/// Line-oriented prompt over any reader/writer pair
struct Terminal<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    fn say(&mut self, text: impl fmt::Display) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }

    /// Prompt and read one line; `None` at end of input
    fn ask(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Prompt until `parse` accepts the answer
    fn ask_until<T>(
        &mut self,
        label: &str,
        parse: impl Fn(&str) -> Result<T>,
    ) -> io::Result<Option<T>> {
        loop {
            let Some(line) = self.ask(label)? else {
                return Ok(None);
            };
            match parse(&line) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => self.say(format!("Error: {}", e))?,
            }
        }
    }
}
