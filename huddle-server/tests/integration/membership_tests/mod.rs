mod test_cancelled_join_leaves_no_member;
