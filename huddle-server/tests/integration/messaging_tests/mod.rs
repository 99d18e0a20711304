mod test_delete_authorization;
mod test_event_order;
mod test_reactions;
mod test_send_broadcasts_to_room;
mod test_status_reaches_every_room;
