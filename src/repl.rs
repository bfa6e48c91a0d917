use chrono::{NaiveTime, Utc};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::commands::{QuickCommand, COMMANDS};
use crate::domains::medical::EMERGENCY_CONTACTS;
use crate::domains::message::Message;
use crate::domains::reminder::{parse_weekday, Reminder};
use crate::error::{MedAssistError, Result};
use crate::services::session::ChatSession;

const HELP: &str = "/1../7 quick commands, /remind <medicine> <HH:MM[,HH:MM]> <mon,fri|Nd>, /reset, /help, /quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ReplInput {
    Command(QuickCommand),
    Remind(String),
    Reset,
    Help,
    Quit,
    Text(String),
    Empty,
}

pub fn parse_input(line: &str) -> ReplInput {
    let line = line.trim();
    if line.is_empty() {
        return ReplInput::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return ReplInput::Text(line.to_string());
    };
    match rest {
        "reset" => ReplInput::Reset,
        "help" | "?" => ReplInput::Help,
        "quit" | "exit" => ReplInput::Quit,
        _ => {
            if let Some(args) = rest.strip_prefix("remind") {
                if args.is_empty() || args.starts_with(char::is_whitespace) {
                    return ReplInput::Remind(args.trim().to_string());
                }
            }
            match rest.parse::<usize>() {
                Ok(n) if (1..=COMMANDS.len()).contains(&n) => {
                    ReplInput::Command(COMMANDS[n - 1].command)
                }
                _ => ReplInput::Text(line.to_string()),
            }
        }
    }
}

/// `<medicine> <HH:MM[,HH:MM]> <mon,fri|Nd>`; times are taken as today in UTC.
pub fn parse_reminder(args: &str) -> Result<Reminder> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(MedAssistError::Validation(
            "usage: /remind <medicine> <HH:MM[,HH:MM]> <mon,fri|Nd>".to_string(),
        ));
    }
    let schedule = parts[parts.len() - 1];
    let times_raw = parts[parts.len() - 2];
    let medicine = parts[..parts.len() - 2].join(" ");

    let today = Utc::now().date_naive();
    let times = times_raw
        .split(',')
        .map(|raw| {
            NaiveTime::parse_from_str(raw, "%H:%M")
                .map(|time| today.and_time(time).and_utc())
                .map_err(|_| MedAssistError::Validation(format!("invalid time: {raw}")))
        })
        .collect::<Result<Vec<_>>>()?;

    if let Some(count) = schedule.strip_suffix('d') {
        if let Ok(days) = count.parse::<u32>() {
            return Reminder::new(medicine, times, Vec::new(), Some(days));
        }
    }
    let days = schedule
        .split(',')
        .map(parse_weekday)
        .collect::<Result<Vec<_>>>()?;
    Reminder::new(medicine, times, days, None)
}

fn format_message(message: &Message) -> String {
    if message.is_emergency_numbers {
        return EMERGENCY_CONTACTS
            .iter()
            .map(|contact| format!("  {:<15} {}", contact.name, contact.number))
            .collect::<Vec<_>>()
            .join("\n");
    }
    format!("bot> {}", message.text)
}

fn command_menu() -> String {
    COMMANDS
        .iter()
        .enumerate()
        .map(|(i, spec)| format!("  /{} {}", i + 1, spec.label))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Interactive terminal conversation. Bot messages are printed as they land,
/// including hospital results that arrive after the prompt returns.
pub async fn run(session: ChatSession) -> Result<()> {
    let mut updates = session.subscribe();
    let printer = tokio::spawn(async move {
        let mut last_seen = 0u64;
        loop {
            let mut fresh = Vec::new();
            for message in updates.borrow_and_update().iter() {
                if message.id.get() <= last_seen {
                    continue;
                }
                last_seen = message.id.get();
                if message.is_bot() {
                    fresh.push(format_message(message));
                }
            }
            for line in fresh {
                println!("{line}");
            }
            if updates.changed().await.is_err() {
                break;
            }
        }
    });

    println!("{}\n{HELP}", command_menu());
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        stdout
            .write_all(b"> ")
            .await
            .map_err(|e| MedAssistError::Runtime(e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| MedAssistError::Runtime(e.to_string()))?;

        let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| MedAssistError::Runtime(e.to_string()))?
        else {
            break;
        };

        let outcome = match parse_input(&line) {
            ReplInput::Empty => Ok(()),
            ReplInput::Quit => break,
            ReplInput::Help => {
                println!("{}\n{HELP}", command_menu());
                Ok(())
            }
            ReplInput::Reset => {
                session.reset_messages();
                Ok(())
            }
            ReplInput::Command(command) => session.handle_command(command.label()).await,
            ReplInput::Remind(args) => match parse_reminder(&args) {
                Ok(reminder) => session.submit_reminder(reminder).await,
                Err(err) => Err(err),
            },
            ReplInput::Text(text) => session.handle_user_message(&text).await,
        };
        if let Err(err) = outcome {
            eprintln!("error: {err}");
        }
        tokio::task::yield_now().await;
    }

    printer.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn numbered_shortcuts_follow_the_command_bar() {
        assert_eq!(
            parse_input("/1"),
            ReplInput::Command(QuickCommand::FindDoctor)
        );
        assert_eq!(
            parse_input(" /7 "),
            ReplInput::Command(QuickCommand::DailyHealthTip)
        );
        assert_eq!(parse_input("/8"), ReplInput::Text("/8".to_string()));
        assert_eq!(parse_input("/reset"), ReplInput::Reset);
        assert_eq!(
            parse_input("/remind Aspirin 08:00 3d"),
            ReplInput::Remind("Aspirin 08:00 3d".to_string())
        );
        assert_eq!(parse_input("/remind"), ReplInput::Remind(String::new()));
        assert_eq!(
            parse_input("/reminders"),
            ReplInput::Text("/reminders".to_string())
        );
        assert_eq!(parse_input("   "), ReplInput::Empty);
        assert_eq!(
            parse_input("aspirin"),
            ReplInput::Text("aspirin".to_string())
        );
    }

    #[test]
    fn reminder_args_accept_both_schedule_modes() {
        let weekly = parse_reminder("Vitamin D 08:00,20:00 fri,mon").unwrap();
        assert_eq!(weekly.medicine_name(), "Vitamin D");
        assert_eq!(weekly.times().len(), 2);
        assert_eq!(weekly.days(), &[Weekday::Mon, Weekday::Fri]);

        let counted = parse_reminder("Amoxicillin 09:30 7d").unwrap();
        assert_eq!(counted.number_of_days(), Some(7));
        assert!(counted.days().is_empty());
    }

    #[test]
    fn malformed_reminder_args_are_rejected() {
        assert!(parse_reminder("Aspirin 08:00").is_err());
        assert!(parse_reminder("Aspirin 8am mon").is_err());
    }
}
