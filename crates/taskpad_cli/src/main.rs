//! Terminal front end for the taskpad core.
//!
//! # Responsibility
//! - Map command-line arguments to routes and user intents.
//! - Render controller commands as plain text lines.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use taskpad_core::db::open_db;
use taskpad_core::{
    core_version, default_log_level, init_logging, Controller, Intent, RenderCommand,
    SqliteTaskStore, Task, TaskId, TaskStore, View,
};

const DB_FILE_ENV: &str = "TASKPAD_DB";
const LOG_DIR_ENV: &str = "TASKPAD_LOG_DIR";
const DEFAULT_DB_FILE: &str = "taskpad.sqlite3";
const STORE_NAME: &str = "todos";

/// Prints render commands as human-readable lines.
struct TerminalView;

impl View for TerminalView {
    fn render(&mut self, command: RenderCommand) {
        match command {
            RenderCommand::ShowEntries(tasks) => {
                for task in &tasks {
                    println!("{}", format_task(task));
                }
            }
            RenderCommand::RemoveItem(id) => println!("removed {id}"),
            RenderCommand::UpdateElementCount(active) => println!("{active} item(s) left"),
            RenderCommand::ClearCompletedButton { completed, visible } => {
                if visible {
                    println!("{completed} completed item(s) can be cleared");
                }
            }
            RenderCommand::ContentBlockVisibility { .. } => {}
            RenderCommand::ToggleAll { checked } => {
                if checked {
                    println!("everything is done");
                }
            }
            RenderCommand::SetFilter(filter) => {
                if !filter.name().is_empty() {
                    println!("filter: {}", filter.name());
                }
            }
            RenderCommand::ClearNewTodo => {}
            RenderCommand::ElementComplete { id, completed } => {
                println!("{} {id}", if completed { "completed" } else { "reopened" });
            }
            RenderCommand::EditItem { id, title } => println!("editing {id}: {title}"),
            RenderCommand::EditItemDone { id, title } => println!("saved {id}: {title}"),
        }
    }
}

fn format_task(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    format!("[{mark}] {:>13}  {}", task.id, task.title)
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("taskpad: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    if let Ok(log_dir) = env::var(LOG_DIR_ENV) {
        init_logging(default_log_level(), &log_dir)?;
    }

    let args: Vec<String> = env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        print_usage();
        return Ok(());
    };

    if command == "help" {
        print_usage();
        return Ok(());
    }
    if command == "version" {
        println!("taskpad {}", core_version());
        return Ok(());
    }

    let conn = open_db(db_path()).map_err(|err| err.to_string())?;
    let store = SqliteTaskStore::open(&conn, STORE_NAME).map_err(|err| err.to_string())?;

    if command == "reset" {
        store.drop_all().map_err(|err| err.to_string())?;
        println!("all tasks dropped");
        return Ok(());
    }

    let mut controller = Controller::new(store, TerminalView);

    match command.as_str() {
        "list" => {
            let route = match rest.first().map(String::as_str) {
                None | Some("all") => "#/".to_string(),
                Some(name) => format!("#/{name}"),
            };
            controller.set_view(&route)
        }
        "add" => controller.dispatch(Intent::NewTodo {
            title: rest.join(" "),
        }),
        "done" => controller.dispatch(Intent::ItemToggle {
            id: parse_id(rest)?,
            completed: true,
        }),
        "undo" => controller.dispatch(Intent::ItemToggle {
            id: parse_id(rest)?,
            completed: false,
        }),
        "toggle-all" => {
            let completed = match rest.first().map(String::as_str) {
                Some("done") | None => true,
                Some("todo") => false,
                Some(other) => return Err(format!("expected done|todo, got `{other}`")),
            };
            controller.dispatch(Intent::ToggleAll { completed })
        }
        "edit" => {
            let id = parse_id(rest)?;
            controller.dispatch(Intent::ItemEditDone {
                id,
                title: rest[1..].join(" "),
            })
        }
        "rm" => controller.dispatch(Intent::ItemRemove {
            id: parse_id(rest)?,
        }),
        "clear-completed" => controller.dispatch(Intent::RemoveCompleted),
        other => return Err(format!("unknown command `{other}`; try `taskpad help`")),
    }
    .map_err(|err| err.to_string())
}

fn db_path() -> PathBuf {
    env::var(DB_FILE_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_FILE))
}

fn parse_id(rest: &[String]) -> Result<TaskId, String> {
    let raw = rest
        .first()
        .ok_or_else(|| "missing task id".to_string())?;
    raw.parse()
        .map_err(|_| format!("invalid task id `{raw}`"))
}

fn print_usage() {
    println!("taskpad — a local task list");
    println!();
    println!("usage:");
    println!("  taskpad list [all|active|completed]   show tasks for a filter");
    println!("  taskpad add <title>                   create a task");
    println!("  taskpad done <id>                     mark a task completed");
    println!("  taskpad undo <id>                     mark a task active again");
    println!("  taskpad toggle-all [done|todo]        drive every task to one state");
    println!("  taskpad edit <id> <title>             retitle a task (empty title deletes)");
    println!("  taskpad rm <id>                       delete a task");
    println!("  taskpad clear-completed               delete every completed task");
    println!("  taskpad reset                         drop the whole collection");
    println!("  taskpad version                       print the core version");
    println!();
    println!("environment:");
    println!("  {DB_FILE_ENV}       database file (default ./{DEFAULT_DB_FILE})");
    println!("  {LOG_DIR_ENV}  absolute directory for rolling log files");
}
