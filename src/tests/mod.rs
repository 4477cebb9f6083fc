mod change_log;
mod home;
mod login;
mod requests;
