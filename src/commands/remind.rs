use super::Session;
use crate::{
    libs::{messages::Message, reminders::ReminderSelector, view::View},
    msg_info, msg_print,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct RemindArgs {
    /// Minutes ahead to look for starting tasks
    #[arg(short, long)]
    minutes: Option<i64>,
}

pub fn cmd(args: RemindArgs) -> Result<()> {
    let session = Session::open()?;
    let lookahead = args.minutes.unwrap_or(session.scheduler.reminder_lookahead_minutes);

    let reminders = ReminderSelector::new(&session.db.conn, &session.clock).due(session.owner, lookahead)?;
    if reminders.is_empty() {
        msg_info!(Message::NoRemindersDue);
        return Ok(());
    }

    msg_print!(Message::RemindersHeader, true);
    View::reminders(&reminders)?;
    Ok(())
}
