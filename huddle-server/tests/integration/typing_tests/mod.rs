mod test_leave_clears_typing;
