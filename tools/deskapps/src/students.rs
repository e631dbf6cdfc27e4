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
pub struct Student {
    pub name: String,
    pub roll_number: i32,
    pub grade: String,
}

impl Student {
    pub fn new(name: impl Into<String>, roll_number: i32, grade: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roll_number,
            grade: grade.into(),
        }
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name: {}, Roll Number: {}, Grade: {}",
            self.name, self.roll_number, self.grade
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub grade: Option<String>,
}

impl Record for Student {
    type Key = i32;
    type Patch = StudentPatch;

    fn matches_key(&self, key: &i32) -> bool {
        self.roll_number == *key
    }

    fn apply_patch(&mut self, patch: &StudentPatch) {
        overwrite_if_present(&mut self.name, patch.name.as_deref());
        overwrite_if_present(&mut self.grade, patch.grade.as_deref());
    }
}

impl TextCodec for Student {
    const ARITY: usize = 3;

    fn fields(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.roll_number.to_string(),
            self.grade.clone(),
        ]
    }

    fn from_fields(fields: &[&str]) -> Option<Self> {
        let [name, roll_number, grade] = fields else {
            return None;
        };
        Some(Self::new(*name, roll_number.parse().ok()?, *grade))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentAction {
    Add,
    Remove,
    Search,
    Edit,
    Display,
}

pub const STUDENT_BINDINGS: [CommandBinding; 5] = [
    CommandBinding {
        verb: "add",
        usage: "add <name>; <roll>; <grade>",
        action: "add student",
    },
    CommandBinding {
        verb: "remove",
        usage: "remove <roll>",
        action: "remove student",
    },
    CommandBinding {
        verb: "search",
        usage: "search <roll>",
        action: "find student",
    },
    CommandBinding {
        verb: "edit",
        usage: "edit <roll>; <name>; <grade>",
        action: "update name/grade",
    },
    CommandBinding {
        verb: "display",
        usage: "display",
        action: "list all students",
    },
];

pub fn action_for_verb(verb: &str) -> Option<StudentAction> {
    match verb {
        "add" => Some(StudentAction::Add),
        "remove" => Some(StudentAction::Remove),
        "search" => Some(StudentAction::Search),
        "edit" => Some(StudentAction::Edit),
        "display" | "list" => Some(StudentAction::Display),
        _ => None,
    }
}

const FILL_ALL_FIELDS: &str = "Please fill all the fields.";

pub struct StudentDesk {
    book: RecordFile<Student>,
}

impl StudentDesk {
    pub fn new(fs: Arc<dyn FileSystem>, data_file: impl Into<PathBuf>) -> Self {
        Self {
            book: RecordFile::new(fs, data_file),
        }
    }

    pub fn students(&self) -> &[Student] {
        self.book.store.list()
    }

    pub fn add(&mut self, name: &str, roll_number: &str, grade: &str) -> Result<Student, DeskError> {
        if name.is_empty() || roll_number.is_empty() || grade.is_empty() {
            return Err(DeskError::InvalidInput(FILL_ALL_FIELDS.to_string()));
        }
        let student = Student::new(name, parse_roll_number(roll_number)?, grade);
        self.book.store.add(student.clone());
        Ok(student)
    }

    pub fn remove(&mut self, roll_number: &str) -> Result<Student, DeskError> {
        let roll_number = required_roll_number(roll_number, "remove")?;
        self.book
            .store
            .remove_by_key(&roll_number)
            .ok_or_else(|| not_found(roll_number))
    }

    pub fn search(&self, roll_number: &str) -> Result<&Student, DeskError> {
        let roll_number = required_roll_number(roll_number, "search")?;
        self.book
            .store
            .search(&roll_number)
            .ok_or_else(|| not_found(roll_number))
    }

    /// Empty `name` or `grade` keeps the stored value.
    pub fn edit(&mut self, roll_number: &str, name: &str, grade: &str) -> Result<Student, DeskError> {
        let roll_number = required_roll_number(roll_number, "edit")?;
        let patch = StudentPatch {
            name: Some(name.to_string()),
            grade: Some(grade.to_string()),
        };
        self.book
            .store
            .edit(&roll_number, &patch)
            .ok_or_else(|| not_found(roll_number))
    }

    pub fn display(&self) -> Vec<String> {
        if self.book.store.is_empty() {
            return vec!["No students found.".to_string()];
        }
        self.students().iter().map(ToString::to_string).collect()
    }
}

impl Desk for StudentDesk {
    fn app(&self) -> AppKind {
        AppKind::Students
    }

    fn bindings(&self) -> &'static [CommandBinding] {
        &STUDENT_BINDINGS
    }

    fn handle(&mut self, verb: &str, args: &str) -> Result<Vec<String>, DeskError> {
        let Some(action) = action_for_verb(verb) else {
            return Err(DeskError::InvalidInput(format!("Unknown command: {verb}")));
        };
        match action {
            StudentAction::Add => {
                let slots = form_slots(args, 3);
                let student = self.add(slots[0], slots[1], slots[2])?;
                Ok(vec![format!("Student added: {student}")])
            }
            StudentAction::Remove => {
                let student = self.remove(args)?;
                Ok(vec![format!("Student removed: {student}")])
            }
            StudentAction::Search => {
                let student = self.search(args)?;
                Ok(vec![format!("Student found: {student}")])
            }
            StudentAction::Edit => {
                let slots = form_slots(args, 3);
                let student = self.edit(slots[0], slots[1], slots[2])?;
                Ok(vec![format!("Student edited: {student}")])
            }
            StudentAction::Display => Ok(self.display()),
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

fn parse_roll_number(value: &str) -> Result<i32, DeskError> {
    value.trim().parse().map_err(|_| {
        DeskError::InvalidInput("Invalid Roll Number. Please enter a valid number.".to_string())
    })
}

fn required_roll_number(value: &str, verb: &str) -> Result<i32, DeskError> {
    if value.trim().is_empty() {
        return Err(DeskError::InvalidInput(format!(
            "Please enter the Roll Number of the student to {verb}."
        )));
    }
    parse_roll_number(value)
}

fn not_found(roll_number: i32) -> DeskError {
    DeskError::NotFound(format!("Student not found with Roll Number: {roll_number}"))
}
