mod test_helpers;
