use crate::codec::TextCodec;
use crate::commands::{form_slots, CommandBinding};
use crate::errors::DeskError;
use crate::file_sync::RecordFile;
use crate::record_store::{overwrite_if_present, Record};
use crate::runtime::FileSystem;
use crate::shell::Desk;
use crate::types::AppKind;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub name: String,
    pub phone: String,
    pub email: String,
}

impl Contact {
    pub fn new(name: impl Into<String>, phone: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
        }
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name: {}, Phone: {}, Email: {}",
            self.name, self.phone, self.email
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Record for Contact {
    type Key = str;
    type Patch = ContactPatch;

    fn matches_key(&self, key: &str) -> bool {
        self.name.to_lowercase() == key.to_lowercase()
    }

    fn apply_patch(&mut self, patch: &ContactPatch) {
        overwrite_if_present(&mut self.phone, patch.phone.as_deref());
        overwrite_if_present(&mut self.email, patch.email.as_deref());
    }
}

impl TextCodec for Contact {
    const ARITY: usize = 3;

    fn fields(&self) -> Vec<String> {
        vec![self.name.clone(), self.phone.clone(), self.email.clone()]
    }

    fn from_fields(fields: &[&str]) -> Option<Self> {
        let [name, phone, email] = fields else {
            return None;
        };
        Some(Self::new(*name, *phone, *email))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactAction {
    Add,
    Remove,
    Search,
    Edit,
    Display,
}

pub const CONTACT_BINDINGS: [CommandBinding; 5] = [
    CommandBinding {
        verb: "add",
        usage: "add <name>; <phone>; <email>",
        action: "add contact",
    },
    CommandBinding {
        verb: "remove",
        usage: "remove <name>",
        action: "remove contact",
    },
    CommandBinding {
        verb: "search",
        usage: "search <name>",
        action: "find contact",
    },
    CommandBinding {
        verb: "edit",
        usage: "edit <name>; <phone>; <email>",
        action: "update phone/email",
    },
    CommandBinding {
        verb: "display",
        usage: "display",
        action: "list all contacts",
    },
];

pub fn action_for_verb(verb: &str) -> Option<ContactAction> {
    match verb {
        "add" => Some(ContactAction::Add),
        "remove" => Some(ContactAction::Remove),
        "search" => Some(ContactAction::Search),
        "edit" => Some(ContactAction::Edit),
        "display" | "list" => Some(ContactAction::Display),
        _ => None,
    }
}

pub struct ContactDesk {
    book: RecordFile<Contact>,
}

impl ContactDesk {
    pub fn new(fs: Arc<dyn FileSystem>, data_file: impl Into<PathBuf>) -> Self {
        Self {
            book: RecordFile::new(fs, data_file),
        }
    }

    pub fn contacts(&self) -> &[Contact] {
        self.book.store.list()
    }

    pub fn add(&mut self, name: &str, phone: &str, email: &str) -> Result<Contact, DeskError> {
        if name.is_empty() || phone.is_empty() || email.is_empty() {
            return Err(DeskError::InvalidInput(
                "Please fill all the fields.".to_string(),
            ));
        }
        let contact = Contact::new(name, phone, email);
        self.book.store.add(contact.clone());
        Ok(contact)
    }

    pub fn remove(&mut self, name: &str) -> Result<Contact, DeskError> {
        let name = required_name(name, "remove")?;
        self.book
            .store
            .remove_by_key(name)
            .ok_or_else(|| not_found(name))
    }

    pub fn search(&self, name: &str) -> Result<&Contact, DeskError> {
        let name = required_name(name, "search")?;
        self.book.store.search(name).ok_or_else(|| not_found(name))
    }

    pub fn edit(&mut self, name: &str, phone: &str, email: &str) -> Result<Contact, DeskError> {
        let name = required_name(name, "edit")?;
        let patch = ContactPatch {
            phone: Some(phone.to_string()),
            email: Some(email.to_string()),
        };
        self.book
            .store
            .edit(name, &patch)
            .ok_or_else(|| not_found(name))
    }

    pub fn display(&self) -> Vec<String> {
        if self.book.store.is_empty() {
            return vec!["No contacts found.".to_string()];
        }
        self.contacts().iter().map(ToString::to_string).collect()
    }
}

impl Desk for ContactDesk {
    fn app(&self) -> AppKind {
        AppKind::Contacts
    }

    fn bindings(&self) -> &'static [CommandBinding] {
        &CONTACT_BINDINGS
    }

    fn handle(&mut self, verb: &str, args: &str) -> Result<Vec<String>, DeskError> {
        let Some(action) = action_for_verb(verb) else {
            return Err(DeskError::InvalidInput(format!("Unknown command: {verb}")));
        };
        match action {
            ContactAction::Add => {
                let slots = form_slots(args, 3);
                let contact = self.add(slots[0], slots[1], slots[2])?;
                Ok(vec![format!("Contact added: {contact}")])
            }
            ContactAction::Remove => {
                let contact = self.remove(args)?;
                Ok(vec![format!("Contact removed: {contact}")])
            }
            ContactAction::Search => {
                let contact = self.search(args)?;
                Ok(vec![format!("Contact found: {contact}")])
            }
            ContactAction::Edit => {
                let slots = form_slots(args, 3);
                let contact = self.edit(slots[0], slots[1], slots[2])?;
                Ok(vec![format!("Contact edited: {contact}")])
            }
            ContactAction::Display => Ok(self.display()),
        }
    }

    fn load(&mut self) -> Result<Option<usize>, DeskError> {
        self.book.load().map(Some)
    }

    fn save(&mut self) -> Result<Option<usize>, DeskError> {
        self.book.save().map(Some)
    }

    fn data_file(&self) -> Option<PathBuf> {
        Some(self.book.path().to_path_buf())
    }
}

fn required_name<'a>(value: &'a str, verb: &str) -> Result<&'a str, DeskError> {
    let name = value.trim();
    if name.is_empty() {
        return Err(DeskError::InvalidInput(format!(
            "Please enter the name of the contact to {verb}."
        )));
    }
    Ok(name)
}

fn not_found(name: &str) -> DeskError {
    DeskError::NotFound(format!("Contact not found with name: {name}"))
}
